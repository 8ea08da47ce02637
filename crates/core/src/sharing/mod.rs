mod operations;
mod types;

pub use operations::{remove_share, resource_shares, share_resource};
pub use types::{
    CollaborationUser, Cursor, PresenceEvent, PresenceState, PresenceUser, ShareEntry,
    SharePermission, ShareSettings, SharedResourceType, ANONYMOUS_EMAIL, DEFAULT_PRESENCE_COLOR,
    SHARES_COLLECTION,
};
