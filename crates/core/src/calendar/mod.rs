mod operations;
mod requests;
mod types;

pub use operations::{
    day_bounds, events_for_day, events_for_week, events_in_range, upcoming_events,
    DEFAULT_UPCOMING_DAYS,
};
pub use requests::UpdateEventRequest;
pub use types::{CalendarEvent, EventReminder, EventSource, ReminderChannel};
