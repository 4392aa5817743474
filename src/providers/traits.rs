use async_trait::async_trait;

use crate::errors::AppError;
use crate::history::{HistoryFilter, HistoryPage, RawHistoryRecord};
use crate::models::{
    LoginGrant, ParkingStatus, RegistrationOutcome, RequestStatus, UserProfile, UserRequest,
};
use crate::providers::types::BackendKind;

/// A source of parking data: the live REST API or the in-memory mock store.
#[async_trait]
pub trait ParkingBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// User-friendly name
    fn name(&self) -> &str;

    /// Credential attached to subsequent requests; `None` drops it.
    fn set_token(&self, token: Option<String>);

    /// `Ok(None)` means the credentials were rejected.
    async fn login(&self, dni: &str, password: &str) -> Result<Option<LoginGrant>, AppError>;

    async fn register(&self, request: &UserRequest) -> Result<RegistrationOutcome, AppError>;

    async fn parking_status(&self) -> Result<ParkingStatus, AppError>;

    async fn profile(&self) -> Result<UserProfile, AppError>;

    /// One page of history for `plate`. Pages start at 1; an empty page means
    /// there is nothing further under this filter.
    async fn history_page(
        &self,
        plate: &str,
        page: u32,
        filter: HistoryFilter,
    ) -> Result<HistoryPage, AppError>;

    /// The movement that has the vehicle parked right now, if any.
    /// Default implementation scans the first history page for an open entry.
    async fn latest_movement(&self, plate: &str) -> Result<Option<RawHistoryRecord>, AppError> {
        let page = self.history_page(plate, 1, HistoryFilter::All).await?;
        Ok(page
            .records
            .into_iter()
            .find(|r| r.exit.as_deref().is_none_or(|e| e.trim().is_empty())))
    }

    /// Administration
    async fn pending_requests(&self) -> Result<Vec<UserRequest>, AppError>;
    async fn review_request(&self, request_id: &str, status: RequestStatus) -> Result<bool, AppError>;
}
