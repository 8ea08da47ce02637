mod operations;
mod requests;
mod types;

pub use operations::{filter_tasks, upcoming_tasks, TaskFilter, UPCOMING_TASK_HORIZON};
pub use requests::UpdateTaskRequest;
pub use types::{Priority, Task};
