use super::AppState;
use crate::errors::AppError;
use crate::models::{RequestStatus, UserRequest};

pub async fn pending_requests(state: &AppState) -> Result<Vec<UserRequest>, AppError> {
    state.require_admin()?;
    let requests = state.backend.pending_requests().await?;
    log::debug!("{} pending registration requests", requests.len());
    Ok(requests)
}

/// Approves or rejects a pending request. Moving a request back to pending is not allowed.
pub async fn review_request(
    state: &AppState,
    request_id: &str,
    status: RequestStatus,
) -> Result<(), AppError> {
    state.require_admin()?;
    if status == RequestStatus::Pending {
        return Err(AppError::Validation(
            "Una solicitud solo puede aprobarse o rechazarse.".to_string(),
        ));
    }

    if !state.backend.review_request(request_id, status).await? {
        return Err(AppError::NotFound(format!("solicitud {}", request_id)));
    }
    log::info!("Request {} reviewed: {}", request_id, status.as_str());
    Ok(())
}
