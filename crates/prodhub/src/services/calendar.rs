use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use prodhub_core::calendar::{
    events_for_day, events_for_week, events_in_range, upcoming_events, CalendarEvent,
    UpdateEventRequest, DEFAULT_UPCOMING_DAYS,
};
use prodhub_core::record::{validate_title, ValidationError};
use prodhub_core::views;

use super::owned;
use crate::collection::CachedCollection;
use crate::error::Result;
use crate::gateway::RemoteStoreGateway;

/// Calendar events of the signed-in user, ordered by start.
#[derive(Clone)]
pub struct CalendarService {
    events: Arc<CachedCollection<CalendarEvent>>,
    upcoming_days: i64,
}

impl CalendarService {
    pub fn new(gateway: RemoteStoreGateway) -> Self {
        Self {
            events: Arc::new(CachedCollection::new(gateway)),
            upcoming_days: DEFAULT_UPCOMING_DAYS,
        }
    }

    /// Sets the look-ahead of [`Self::upcoming`].
    pub fn with_upcoming_days(mut self, days: i64) -> Self {
        self.upcoming_days = days;
        self
    }

    pub fn collection(&self) -> &Arc<CachedCollection<CalendarEvent>> {
        &self.events
    }

    pub fn bind(&self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        self.events.bind(shutdown)
    }

    pub fn observe(&self) -> watch::Receiver<Vec<CalendarEvent>> {
        self.events.observe()
    }

    pub async fn reload(&self) {
        self.events.reload().await
    }

    pub async fn add(&self, event: CalendarEvent) -> Result<String> {
        self.events.add(event).await
    }

    /// Updates an event. New times are checked against the cached event so
    /// that `end` never ends up before `start`.
    pub async fn update(&self, id: &str, request: &UpdateEventRequest) -> Result<()> {
        if let Some(title) = &request.title {
            validate_title(title)?;
        }
        if let Some(current) = self.get(id) {
            let start = request.start.unwrap_or(current.start);
            let end = request.end.unwrap_or(current.end);
            if end < start {
                return Err(ValidationError::InvalidTimeRange.into());
            }
        }
        self.events.update(id, request).await
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        self.events.remove(id).await
    }

    pub fn all(&self) -> Vec<CalendarEvent> {
        self.events.snapshot()
    }

    pub fn get(&self, id: &str) -> Option<CalendarEvent> {
        self.events
            .with_snapshot(|events| views::find_by_id(events, id).cloned())
    }

    /// Events lying entirely within `[start, end]`.
    pub fn in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<CalendarEvent> {
        self.events
            .with_snapshot(|events| owned(events_in_range(events, start, end)))
    }

    /// Events starting within the configured number of days.
    pub fn upcoming(&self) -> Vec<CalendarEvent> {
        self.upcoming_within(self.upcoming_days)
    }

    pub fn upcoming_within(&self, days: i64) -> Vec<CalendarEvent> {
        let now = self.events.gateway().clock().now();
        self.events
            .with_snapshot(|events| owned(upcoming_events(events, now, days)))
    }

    /// Events overlapping a local calendar day.
    pub fn for_day(&self, day: NaiveDate) -> Vec<CalendarEvent> {
        self.events
            .with_snapshot(|events| owned(events_for_day(events, day, &Local)))
    }

    pub fn for_week(&self, week_start: DateTime<Utc>) -> Vec<CalendarEvent> {
        self.events
            .with_snapshot(|events| owned(events_for_week(events, week_start)))
    }
}

#[cfg(all(test, feature = "inmemory"))]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::error::CollectionError;
    use crate::testing::{ten_am, Harness};

    fn setup() -> (Harness, CalendarService) {
        let harness = Harness::new();
        harness.sign_in("u1");
        let service = CalendarService::new(harness.gateway.clone());
        (harness, service)
    }

    fn event(title: &str, start_in_hours: i64, length_hours: i64) -> CalendarEvent {
        let start = ten_am() + Duration::hours(start_in_hours);
        CalendarEvent::new(title, start, start + Duration::hours(length_hours))
    }

    #[tokio::test]
    async fn test_add_rejects_inverted_times() {
        let (_harness, service) = setup();

        let result = service.add(event("backwards", 2, -1)).await;

        assert_eq!(
            result,
            Err(CollectionError::Validation(ValidationError::InvalidTimeRange))
        );
    }

    #[tokio::test]
    async fn test_update_checks_against_cached_times() {
        let (_harness, service) = setup();
        let id = service.add(event("standup", 1, 1)).await.unwrap();

        let bad = service
            .update(&id, &UpdateEventRequest { end: Some(ten_am()), ..Default::default() })
            .await;
        assert!(matches!(bad, Err(CollectionError::Validation(_))));

        let new_start = ten_am() + Duration::hours(3);
        service
            .update(&id, &UpdateEventRequest::new().with_times(new_start, new_start + Duration::hours(1)))
            .await
            .unwrap();
        assert_eq!(service.get(&id).unwrap().start, new_start);
    }

    #[tokio::test]
    async fn test_sorted_by_start() {
        let (_harness, service) = setup();
        service.add(event("later", 5, 1)).await.unwrap();
        service.add(event("sooner", 1, 1)).await.unwrap();

        let titles: Vec<_> = service.all().into_iter().map(|e| e.title).collect();

        assert_eq!(titles, vec!["sooner", "later"]);
    }

    #[tokio::test]
    async fn test_range_upcoming_and_week_views() {
        let (_harness, service) = setup();
        service.add(event("today", 1, 1)).await.unwrap();
        service.add(event("in three days", 72, 1)).await.unwrap();
        service.add(event("in ten days", 240, 1)).await.unwrap();
        service.add(event("yesterday", -24, 1)).await.unwrap();

        let titles = |events: Vec<CalendarEvent>| -> Vec<String> {
            events.into_iter().map(|e| e.title).collect()
        };

        assert_eq!(titles(service.upcoming()), vec!["today", "in three days"]);
        assert_eq!(
            titles(service.upcoming_within(1)),
            vec!["today"]
        );
        assert_eq!(
            titles(service.in_range(ten_am(), ten_am() + Duration::hours(2))),
            vec!["today"]
        );
        assert_eq!(
            titles(service.for_week(ten_am() - Duration::days(1))),
            vec!["yesterday", "today", "in three days"]
        );
    }

    #[tokio::test]
    async fn test_for_day_uses_overlap() {
        let (_harness, service) = setup();
        let id = service.add(event("long", 0, 30)).await.unwrap();

        let start_day = service.get(&id).unwrap().start.with_timezone(&Local).date_naive();
        let next_day = start_day.succ_opt().unwrap();

        assert_eq!(service.for_day(start_day).len(), 1);
        assert_eq!(service.for_day(next_day).len(), 1);
    }
}
