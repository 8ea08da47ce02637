mod documents;
mod error;
mod query;
mod traits;
mod types;

pub use documents::{
    apply_patch, bump_updated_at, decode, encode, prepare_insert, prepare_upsert, CREATED_AT,
    ID, UPDATED_AT,
};
pub use error::{Result, StoreError};
pub use query::{apply_query, compare_values, matches_all, Direction, Operator, OrderBy, Predicate};
pub use traits::DocumentStore;
pub use types::{CollectionPath, Document};
