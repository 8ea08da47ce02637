//! Domain services.
//!
//! Each service owns one [`CachedCollection`](crate::collection::CachedCollection)
//! and adds the domain operations and views on top of it. Views return
//! owned copies, so callers can never touch the snapshot.

mod calendar;
mod journal;
mod notes;
mod notifications;
mod tasks;

pub use calendar::CalendarService;
pub use journal::JournalService;
pub use notes::NoteService;
pub use notifications::NotificationService;
pub use tasks::TaskService;

fn owned<T: Clone>(records: Vec<&T>) -> Vec<T> {
    records.into_iter().cloned().collect()
}
