//! Parking history: fetching pages, normalizing records, grouping them by day.
//!
//! ```text
//! [filter/page] → HistoryFetcher → RawHistoryRecord → normalize → HistoryFeed → group → sections
//! ```

pub mod feed;
pub mod filter;
pub mod group;
pub mod models;
pub mod normalize;

use chrono::NaiveDate;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::clock::Clock;
use crate::errors::AppError;
use crate::providers::ParkingBackend;

pub use feed::{ApplyOutcome, FetchTicket, HistoryFeed, HistoryView, PageBatch};
pub use filter::HistoryFilter;
pub use group::{group, section_label};
pub use models::{HistoryPage, HistoryRecord, HistorySection, RawHistoryRecord, Timestamp};
pub use normalize::{normalize, normalize_page, NormalizeError};

/// Reads history pages from a backend. Never fails: any backend error is
/// logged and reported as an empty page, which callers treat as exhaustion.
#[derive(Clone)]
pub struct HistoryFetcher {
    backend: Arc<dyn ParkingBackend>,
}

impl HistoryFetcher {
    pub fn new(backend: Arc<dyn ParkingBackend>) -> Self {
        Self { backend }
    }

    pub async fn fetch(&self, plate: &str, page: u32, filter: HistoryFilter) -> HistoryPage {
        let plate = plate.trim();
        if plate.is_empty() {
            log::debug!("No plate available, skipping history fetch");
            return HistoryPage::empty();
        }

        match self.backend.history_page(plate, page.max(1), filter).await {
            Ok(result) => {
                log::debug!(
                    "History page {} for {} ({}): {} records",
                    page,
                    plate,
                    filter,
                    result.records.len()
                );
                result
            }
            Err(e) => {
                log::warn!("History page {} for {} failed: {}", page, plate, e);
                HistoryPage::empty()
            }
        }
    }

    pub async fn fetch_ticket(&self, ticket: &FetchTicket) -> PageBatch {
        let page = self.fetch(&ticket.plate, ticket.page, ticket.filter).await;
        PageBatch {
            records: normalize_page(&page.records),
            received: page.records.len(),
            total: page.total,
            pages: page.pages,
        }
    }

    /// The open movement for `plate`; `Ok(None)` when the vehicle is not parked.
    pub async fn latest(&self, plate: &str) -> Result<Option<HistoryRecord>, AppError> {
        let plate = plate.trim();
        if plate.is_empty() {
            return Ok(None);
        }

        match self.backend.latest_movement(plate).await? {
            None => Ok(None),
            Some(raw) => match normalize(&raw) {
                Ok(record) => Ok(Some(record)),
                Err(e) => {
                    log::warn!("Ignoring unreadable latest movement for {}: {}", plate, e);
                    Ok(None)
                }
            },
        }
    }
}

/// Drives a [`HistoryFeed`] against a fetcher. The feed lock is only taken
/// between awaits, so concurrent calls interleave safely and late answers for
/// an old filter are dropped by generation.
#[derive(Clone)]
pub struct HistoryController {
    feed: Arc<Mutex<HistoryFeed>>,
    fetcher: HistoryFetcher,
    clock: Arc<dyn Clock>,
}

impl HistoryController {
    pub fn new(fetcher: HistoryFetcher, clock: Arc<dyn Clock>, plate: &str) -> Self {
        Self {
            feed: Arc::new(Mutex::new(HistoryFeed::new(plate))),
            fetcher,
            clock,
        }
    }

    /// Loads page 1 of the current filter.
    pub async fn open(&self) -> HistoryView {
        let ticket = self.feed.lock().reload();
        self.run(ticket).await
    }

    pub async fn set_filter(&self, filter: HistoryFilter) -> HistoryView {
        let ticket = self.feed.lock().set_filter(filter);
        self.run(ticket).await
    }

    pub async fn select_date(&self, date: NaiveDate) -> HistoryView {
        let ticket = self.feed.lock().select_date(date);
        self.run(ticket).await
    }

    pub async fn load_more(&self) -> HistoryView {
        let ticket = self.feed.lock().load_more();
        match ticket {
            Some(ticket) => self.run(ticket).await,
            None => self.view(),
        }
    }

    pub fn view(&self) -> HistoryView {
        let today = self.clock.today();
        self.feed.lock().view(today)
    }

    pub fn filter(&self) -> HistoryFilter {
        self.feed.lock().filter()
    }

    pub fn is_exhausted(&self) -> bool {
        self.feed.lock().is_exhausted()
    }

    pub fn records(&self) -> Vec<HistoryRecord> {
        self.feed.lock().records().to_vec()
    }

    async fn run(&self, ticket: FetchTicket) -> HistoryView {
        let batch = self.fetcher.fetch_ticket(&ticket).await;
        let outcome = self.feed.lock().apply(&ticket, batch);
        if outcome == ApplyOutcome::Exhausted {
            log::debug!(
                "History for {} exhausted at page {} ({})",
                ticket.plate,
                ticket.page,
                ticket.filter
            );
        }
        self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::mock::MockBackend;
    use std::collections::HashSet;
    use std::time::Duration;

    fn now() -> chrono::NaiveDateTime {
        chrono::NaiveDateTime::parse_from_str("2025-11-10 10:00", "%Y-%m-%d %H:%M").unwrap()
    }

    fn setup(latency_ms: u64) -> (Arc<MockBackend>, HistoryController) {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(now()));
        let backend = Arc::new(
            MockBackend::new(clock.clone()).with_latency(Duration::from_millis(latency_ms)),
        );
        let fetcher = HistoryFetcher::new(backend.clone());
        let controller = HistoryController::new(fetcher, clock, "V1X-234");
        (backend, controller)
    }

    #[tokio::test]
    async fn test_paging_collects_every_record_once() {
        let (backend, controller) = setup(0);
        controller.open().await;
        while !controller.is_exhausted() {
            controller.load_more().await;
        }

        let ids: Vec<String> = controller.records().into_iter().map(|r| r.id).collect();
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(ids.len(), unique.len());
        assert_eq!(ids.len(), backend.history_len("V1X-234"));
    }

    #[tokio::test]
    async fn test_empty_plate_makes_no_call() {
        let (backend, _) = setup(0);
        let fetcher = HistoryFetcher::new(backend.clone());
        let page = fetcher.fetch("  ", 1, HistoryFilter::All).await;
        assert!(page.is_empty());
        assert_eq!(backend.history_calls(), 0);
        assert_eq!(fetcher.latest("").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_opening_groups_today_and_yesterday() {
        let (_, controller) = setup(0);
        match controller.open().await {
            HistoryView::Sections {
                sections,
                can_load_more,
                ..
            } => {
                assert_eq!(sections[0].title, "Hoy");
                assert_eq!(sections[1].title, "Ayer");
                assert!(can_load_more);
            }
            other => panic!("unexpected view {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_week_filter_window() {
        let (_, controller) = setup(0);
        controller.set_filter(HistoryFilter::Week).await;
        while !controller.is_exhausted() {
            controller.load_more().await;
        }
        let from = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 11, 10).unwrap();
        let records = controller.records();
        assert!(!records.is_empty());
        assert!(records
            .iter()
            .all(|r| r.entry_date() >= from && r.entry_date() <= to));
    }

    #[tokio::test]
    async fn test_filter_change_wins_over_late_page() {
        let (_, controller) = setup(40);
        controller.open().await;

        let date = NaiveDate::from_ymd_opt(2025, 11, 8).unwrap();
        let switcher = controller.clone();
        tokio::join!(controller.load_more(), async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            switcher.select_date(date).await;
        });

        let records = controller.records();
        assert!(!records.is_empty());
        assert!(records.iter().all(|r| r.entry_date() == date));
        assert_eq!(controller.filter(), HistoryFilter::Custom(date));
    }

    #[tokio::test]
    async fn test_date_without_records_is_empty_view() {
        let (_, controller) = setup(0);
        let view = controller
            .select_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .await;
        assert_eq!(view, HistoryView::Empty);
        assert!(controller.is_exhausted());
    }

    /// Serves fixed raw pages, or fails every history call.
    struct ScriptedBackend {
        pages: Vec<Vec<RawHistoryRecord>>,
        fail: bool,
    }

    fn raw(id: &str, entry: &str) -> RawHistoryRecord {
        RawHistoryRecord {
            id: Some(id.to_string()),
            area: Some("Ingenierías".to_string()),
            gate: Some("Puerta Paucarpata".to_string()),
            plate: Some("V1X-234".to_string()),
            entry: Some(entry.to_string()),
            exit: None,
        }
    }

    fn unsupported<T>() -> Result<T, AppError> {
        Err(AppError::Internal("not scripted".to_string()))
    }

    #[async_trait::async_trait]
    impl ParkingBackend for ScriptedBackend {
        fn kind(&self) -> crate::providers::BackendKind {
            crate::providers::BackendKind::Mock
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn set_token(&self, _token: Option<String>) {}

        async fn login(
            &self,
            _dni: &str,
            _password: &str,
        ) -> Result<Option<crate::models::LoginGrant>, AppError> {
            unsupported()
        }

        async fn register(
            &self,
            _request: &crate::models::UserRequest,
        ) -> Result<crate::models::RegistrationOutcome, AppError> {
            unsupported()
        }

        async fn parking_status(&self) -> Result<crate::models::ParkingStatus, AppError> {
            unsupported()
        }

        async fn profile(&self) -> Result<crate::models::UserProfile, AppError> {
            unsupported()
        }

        async fn history_page(
            &self,
            _plate: &str,
            page: u32,
            _filter: HistoryFilter,
        ) -> Result<HistoryPage, AppError> {
            if self.fail {
                return Err(AppError::Network("connection refused".to_string()));
            }
            Ok(HistoryPage {
                records: self
                    .pages
                    .get(page as usize - 1)
                    .cloned()
                    .unwrap_or_default(),
                total: None,
                pages: Some(self.pages.len() as u32),
            })
        }

        async fn pending_requests(&self) -> Result<Vec<crate::models::UserRequest>, AppError> {
            unsupported()
        }

        async fn review_request(
            &self,
            _request_id: &str,
            _status: crate::models::RequestStatus,
        ) -> Result<bool, AppError> {
            unsupported()
        }
    }

    fn scripted(backend: ScriptedBackend) -> HistoryController {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(now()));
        HistoryController::new(HistoryFetcher::new(Arc::new(backend)), clock, "V1X-234")
    }

    #[tokio::test]
    async fn test_page_of_unreadable_records_does_not_end_paging() {
        let controller = scripted(ScriptedBackend {
            pages: vec![
                vec![raw("1", "2025-11-10 08:30")],
                vec![raw("2", "garbage")],
                vec![raw("3", "2025-11-08 07:45")],
            ],
            fail: false,
        });

        controller.open().await;
        while !controller.is_exhausted() {
            controller.load_more().await;
        }

        let ids: Vec<String> = controller.records().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_backend_failure_reads_as_exhausted() {
        let backend = Arc::new(ScriptedBackend {
            pages: Vec::new(),
            fail: true,
        });

        let fetcher = HistoryFetcher::new(backend.clone());
        let page = fetcher.fetch("V1X-234", 1, HistoryFilter::All).await;
        assert_eq!(page, HistoryPage::empty());

        let clock: Arc<dyn Clock> = Arc::new(FixedClock(now()));
        let controller = HistoryController::new(fetcher, clock, "V1X-234");
        assert_eq!(controller.open().await, HistoryView::Empty);
        assert!(controller.is_exhausted());
        assert_eq!(controller.load_more().await, HistoryView::Empty);
    }
}
