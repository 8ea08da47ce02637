use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::serde::deserialize_timestamp;

/// Collection holding one document per shared resource.
pub const SHARES_COLLECTION: &str = "share_settings";

/// Shown for collaborators who have not announced an email.
pub const ANONYMOUS_EMAIL: &str = "Anonymous";

/// Cursor color for collaborators who have not picked one.
pub const DEFAULT_PRESENCE_COLOR: &str = "#000000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharePermission {
    View,
    Edit,
    Admin,
}

impl std::fmt::Display for SharePermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::View => "view",
            Self::Edit => "edit",
            Self::Admin => "admin",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for SharePermission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "view" => Ok(Self::View),
            "edit" => Ok(Self::Edit),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown permission: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharedResourceType {
    Note,
    Task,
    Journal,
}

impl std::fmt::Display for SharedResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Note => "note",
            Self::Task => "task",
            Self::Journal => "journal",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for SharedResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "note" => Ok(Self::Note),
            "task" => Ok(Self::Task),
            "journal" => Ok(Self::Journal),
            other => Err(format!("unknown resource type: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareEntry {
    pub email: String,
    pub permission: SharePermission,
}

/// Who a resource is shared with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareSettings {
    pub id: String,
    pub resource_id: String,
    pub resource_type: SharedResourceType,
    #[serde(default)]
    pub shared_with: Vec<ShareEntry>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl ShareSettings {
    /// Permission granted to `email`, if any.
    pub fn permission_for(&self, email: &str) -> Option<SharePermission> {
        self.shared_with
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.permission)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
}

/// Who is behind a presence state, as announced by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// One client's awareness state on the presence channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceState {
    pub client_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<PresenceUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
}

impl PresenceState {
    pub fn new(client_id: u64) -> Self {
        Self {
            client_id,
            user: None,
            cursor: None,
        }
    }

    pub fn with_user(mut self, user: PresenceUser) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_cursor(mut self, x: f64, y: f64) -> Self {
        self.cursor = Some(Cursor { x, y });
        self
    }
}

/// A change on the presence channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PresenceEvent {
    /// A client joined or changed its state.
    Update(PresenceState),
    Leave { client_id: u64 },
}

/// A collaborator currently present on a shared resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationUser {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
}

impl From<&PresenceState> for CollaborationUser {
    fn from(state: &PresenceState) -> Self {
        let user = state.user.clone().unwrap_or_default();
        Self {
            id: state.client_id.to_string(),
            email: user.email.unwrap_or_else(|| ANONYMOUS_EMAIL.to_string()),
            name: user.name,
            color: user
                .color
                .unwrap_or_else(|| DEFAULT_PRESENCE_COLOR.to_string()),
            cursor: state.cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collaborator_defaults_for_anonymous_state() {
        let user = CollaborationUser::from(&PresenceState::new(42));

        assert_eq!(user.id, "42");
        assert_eq!(user.email, ANONYMOUS_EMAIL);
        assert_eq!(user.color, DEFAULT_PRESENCE_COLOR);
        assert!(user.cursor.is_none());
    }

    #[test]
    fn test_collaborator_from_announced_state() {
        let state = PresenceState::new(7)
            .with_user(PresenceUser {
                email: Some("ada@example.com".into()),
                name: Some("Ada".into()),
                color: Some("#ff0000".into()),
            })
            .with_cursor(10.0, 20.5);

        let user = CollaborationUser::from(&state);

        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.name.as_deref(), Some("Ada"));
        assert_eq!(user.cursor, Some(Cursor { x: 10.0, y: 20.5 }));
    }

    #[test]
    fn test_resource_type_round_trips_through_str() {
        for kind in [SharedResourceType::Note, SharedResourceType::Task, SharedResourceType::Journal] {
            assert_eq!(kind.to_string().parse::<SharedResourceType>(), Ok(kind));
        }
        assert!("calendar".parse::<SharedResourceType>().is_err());
    }

    #[test]
    fn test_presence_event_is_tagged() {
        let value = serde_json::to_value(PresenceEvent::Leave { client_id: 3 }).unwrap();
        assert_eq!(value, json!({"kind": "leave", "client_id": 3}));
    }
}
