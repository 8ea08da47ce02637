mod requests;
mod types;

pub use requests::UpdateNoteRequest;
pub use types::Note;
