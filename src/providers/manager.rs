use std::sync::Arc;

use crate::api::ApiClient;
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::mock::MockBackend;
use crate::providers::traits::ParkingBackend;

/// Picks the backend the configuration asks for.
pub fn connect(config: &AppConfig) -> Result<Arc<dyn ParkingBackend>, AppError> {
    connect_with_clock(config, Arc::new(SystemClock))
}

pub fn connect_with_clock(
    config: &AppConfig,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn ParkingBackend>, AppError> {
    let backend: Arc<dyn ParkingBackend> = match &config.api_base_url {
        Some(url) => Arc::new(ApiClient::new(url, config.request_timeout())?),
        None => Arc::new(MockBackend::new(clock)),
    };
    log::info!("Using {} backend ({})", backend.name(), backend.kind());
    Ok(backend)
}
