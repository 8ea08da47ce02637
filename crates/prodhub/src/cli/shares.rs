//! Share CLI commands.

use clap::{Parser, Subcommand};

use prodhub_core::sharing::{SharePermission, SharedResourceType, SHARES_COLLECTION};
use prodhub_core::storage::StoreError;

use super::OutputFormat;
use crate::context::AppContext;
use crate::error::Result;
use crate::output::{pretty, render};

/// Share management commands.
#[derive(Debug, Parser)]
pub struct SharesCommand {
    #[command(subcommand)]
    pub action: SharesAction,
}

/// Available share actions.
#[derive(Debug, Subcommand)]
pub enum SharesAction {
    /// List every shared resource.
    List,
    /// Show who a resource is shared with.
    Show {
        resource_id: String,
    },
    /// Grant someone access to a resource.
    Add {
        resource_id: String,
        email: String,
        /// Resource type (note, task or journal).
        #[arg(long = "type", default_value = "note")]
        resource_type: SharedResourceType,
        /// Permission (view, edit or admin).
        #[arg(long, default_value = "view")]
        permission: SharePermission,
    },
    /// Revoke someone's access to a resource.
    Remove {
        resource_id: String,
        email: String,
    },
}

pub async fn run(command: SharesCommand, context: &AppContext, format: OutputFormat) -> Result<String> {
    let sharing = &context.collaboration;

    let output = match command.action {
        SharesAction::List => render(&sharing.shares(), format, |s| pretty::format_shares(s)),
        SharesAction::Show { resource_id } => {
            let settings = sharing
                .shares_for(&resource_id)
                .ok_or_else(|| StoreError::not_found(SHARES_COLLECTION, &resource_id))?;
            render(&settings, format, pretty::format_share_settings)
        }
        SharesAction::Add {
            resource_id,
            email,
            resource_type,
            permission,
        } => {
            sharing
                .share(&resource_id, resource_type, &email, permission)
                .await?;
            let settings = sharing
                .shares_for(&resource_id)
                .ok_or_else(|| StoreError::not_found(SHARES_COLLECTION, &resource_id))?;
            render(&settings, format, |s| format!("Shared:\n{}", pretty::format_share_settings(s)))
        }
        SharesAction::Remove { resource_id, email } => {
            if sharing.unshare(&resource_id, &email).await? {
                format!("Revoked {email} on {resource_id}")
            } else {
                format!("{email} had no access to {resource_id}")
            }
        }
    };

    Ok(output)
}
