use std::fmt;

use serde_json::{Map, Value};

/// A raw document as stored: a JSON object.
pub type Document = Map<String, Value>;

/// Location of a per-user collection: `users/{user_id}/{collection}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    pub user_id: String,
    pub collection: String,
}

impl CollectionPath {
    pub fn new(user_id: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            collection: collection.into(),
        }
    }

    /// The `users/{user_id}` prefix shared by all of a user's collections.
    pub fn namespace(&self) -> String {
        format!("users/{}", self.user_id)
    }

    /// Full path of a single document.
    pub fn document(&self, id: &str) -> String {
        format!("{self}/{id}")
    }

    /// Parses `users/{user_id}/{collection}`.
    ///
    /// # Examples
    ///
    /// ```
    /// use prodhub_core::storage::CollectionPath;
    ///
    /// let path = CollectionPath::parse("users/u1/tasks").unwrap();
    /// assert_eq!(path, CollectionPath::new("u1", "tasks"));
    ///
    /// assert_eq!(CollectionPath::parse("tasks"), None);
    /// assert_eq!(CollectionPath::parse("users//tasks"), None);
    /// ```
    pub fn parse(path: &str) -> Option<Self> {
        let rest = path.strip_prefix("users/")?;
        let (user_id, collection) = rest.split_once('/')?;
        if user_id.is_empty() || collection.is_empty() || collection.contains('/') {
            return None;
        }
        Some(Self::new(user_id, collection))
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "users/{}/{}", self.user_id, self.collection)
    }
}
