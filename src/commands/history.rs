use super::AppState;
use crate::errors::AppError;
use crate::history::{HistoryController, HistoryFetcher, HistoryRecord, HistoryView};

/// A history feed for the session's plate, already loaded with page 1.
/// Without a plate the feed stays empty and no request is made.
pub async fn open_history(state: &AppState) -> Result<(HistoryController, HistoryView), AppError> {
    let session = state.require_session()?;
    let plate = session.plate().unwrap_or_default();
    if plate.is_empty() {
        log::info!("Session has no vehicle, history will be empty");
    }

    let controller = HistoryController::new(
        HistoryFetcher::new(state.backend.clone()),
        state.clock.clone(),
        plate,
    );
    let view = controller.open().await;
    Ok((controller, view))
}

pub async fn latest_movement(state: &AppState) -> Result<Option<HistoryRecord>, AppError> {
    let session = state.require_session()?;
    HistoryFetcher::new(state.backend.clone())
        .latest(session.plate().unwrap_or_default())
        .await
}
