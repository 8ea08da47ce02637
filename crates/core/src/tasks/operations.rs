use chrono::{DateTime, Duration, Utc};

use super::types::Task;

/// How far ahead a task counts as upcoming.
pub const UPCOMING_TASK_HORIZON: Duration = Duration::hours(24);

/// Completion filter for task lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl std::str::FromStr for TaskFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown task filter: {other}")),
        }
    }
}

/// Filters tasks by completion state.
pub fn filter_tasks(tasks: &[Task], filter: TaskFilter) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| match filter {
            TaskFilter::All => true,
            TaskFilter::Active => !task.completed,
            TaskFilter::Completed => task.completed,
        })
        .collect()
}

/// Open tasks due between `now` and `now + horizon`, both inclusive.
pub fn upcoming_tasks(tasks: &[Task], now: DateTime<Utc>, horizon: Duration) -> Vec<&Task> {
    let until = now + horizon;
    tasks
        .iter()
        .filter(|task| !task.completed)
        .filter(|task| task.due_date.is_some_and(|due| due >= now && due <= until))
        .collect()
}
