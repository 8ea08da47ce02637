//! Share-list edits. Each function works on the full list of settings.

use chrono::{DateTime, Utc};

use super::types::{ShareEntry, SharePermission, SharedResourceType, ShareSettings};
use crate::record::placeholder_id;

/// Grants `email` the given permission on a resource.
///
/// An existing grant for the same email is replaced. Settings are created
/// for resources that have none yet.
pub fn share_resource(
    settings: &mut Vec<ShareSettings>,
    resource_id: &str,
    resource_type: SharedResourceType,
    email: &str,
    permission: SharePermission,
    now: DateTime<Utc>,
) {
    let entry = ShareEntry {
        email: email.to_string(),
        permission,
    };

    if let Some(existing) = settings.iter_mut().find(|s| s.resource_id == resource_id) {
        existing.shared_with.retain(|e| e.email != email);
        existing.shared_with.push(entry);
        existing.updated_at = now;
        return;
    }

    settings.push(ShareSettings {
        id: placeholder_id(),
        resource_id: resource_id.to_string(),
        resource_type,
        shared_with: vec![entry],
        created_at: now,
        updated_at: now,
    });
}

/// Revokes whatever `email` was granted on a resource.
///
/// Returns false when there was nothing to revoke.
pub fn remove_share(
    settings: &mut [ShareSettings],
    resource_id: &str,
    email: &str,
    now: DateTime<Utc>,
) -> bool {
    let Some(existing) = settings.iter_mut().find(|s| s.resource_id == resource_id) else {
        return false;
    };
    let before = existing.shared_with.len();
    existing.shared_with.retain(|e| e.email != email);
    if existing.shared_with.len() == before {
        return false;
    }
    existing.updated_at = now;
    true
}

pub fn resource_shares<'a>(settings: &'a [ShareSettings], resource_id: &str) -> Option<&'a ShareSettings> {
    settings.iter().find(|s| s.resource_id == resource_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_share_creates_settings_for_new_resource() {
        let mut settings = Vec::new();

        share_resource(&mut settings, "n1", SharedResourceType::Note, "a@x.io", SharePermission::View, now());

        assert_eq!(settings.len(), 1);
        let shares = resource_shares(&settings, "n1").unwrap();
        assert_eq!(shares.permission_for("a@x.io"), Some(SharePermission::View));
        assert_eq!(shares.created_at, now());
    }

    #[test]
    fn test_share_replaces_existing_grant() {
        let mut settings = Vec::new();
        share_resource(&mut settings, "n1", SharedResourceType::Note, "a@x.io", SharePermission::View, now());
        share_resource(&mut settings, "n1", SharedResourceType::Note, "b@x.io", SharePermission::Edit, now());

        let later = now() + Duration::minutes(5);
        share_resource(&mut settings, "n1", SharedResourceType::Note, "a@x.io", SharePermission::Admin, later);

        let shares = resource_shares(&settings, "n1").unwrap();
        assert_eq!(settings.len(), 1);
        assert_eq!(shares.shared_with.len(), 2);
        assert_eq!(shares.permission_for("a@x.io"), Some(SharePermission::Admin));
        assert_eq!(shares.updated_at, later);
    }

    #[test]
    fn test_remove_share() {
        let mut settings = Vec::new();
        share_resource(&mut settings, "t1", SharedResourceType::Task, "a@x.io", SharePermission::Edit, now());

        assert!(!remove_share(&mut settings, "t1", "nobody@x.io", now()));
        assert!(!remove_share(&mut settings, "missing", "a@x.io", now()));
        assert!(remove_share(&mut settings, "t1", "a@x.io", now()));

        let shares = resource_shares(&settings, "t1").unwrap();
        assert!(shares.shared_with.is_empty());
    }

    #[test]
    fn test_resource_shares_missing() {
        assert!(resource_shares(&[], "x").is_none());
    }
}
