use futures_util::future;
use serde::Serialize;

use super::AppState;
use crate::errors::AppError;
use crate::history::{HistoryFetcher, HistoryRecord};
use crate::models::{Area, ParkingStatus};

/// Home screen: live occupancy plus where the user's vehicle is parked.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub user_name: Option<String>,
    pub plate: Option<String>,
    pub status: ParkingStatus,
    pub total_available: u32,
    pub current_stay: Option<HistoryRecord>,
}

pub async fn parking_status(state: &AppState) -> Result<ParkingStatus, AppError> {
    state.backend.parking_status().await
}

pub async fn area_detail(state: &AppState, area_id: &str) -> Result<Area, AppError> {
    let status = state.backend.parking_status().await?;
    status
        .area(area_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("área {}", area_id)))
}

pub async fn dashboard(state: &AppState) -> Result<Dashboard, AppError> {
    let session = state.require_session()?;
    let plate = session.plate().map(str::to_string);
    let fetcher = HistoryFetcher::new(state.backend.clone());

    let (status, latest) = future::join(
        state.backend.parking_status(),
        fetcher.latest(plate.as_deref().unwrap_or_default()),
    )
    .await;

    let current_stay = latest.unwrap_or_else(|e| {
        log::warn!("Latest movement unavailable: {}", e);
        None
    });
    let status = status?;

    Ok(Dashboard {
        user_name: session.profile.as_ref().map(|p| p.full_name.clone()),
        plate,
        total_available: status.total_available(),
        status,
        current_stay,
    })
}
