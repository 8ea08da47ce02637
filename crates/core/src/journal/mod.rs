mod operations;
mod requests;
mod types;

pub use operations::{entries_by_mood, entries_in_range, entries_on_day};
pub use requests::UpdateJournalEntryRequest;
pub use types::{JournalEntry, Mood};
