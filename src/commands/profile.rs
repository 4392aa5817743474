use super::AppState;
use crate::errors::AppError;
use crate::models::UserProfile;
use crate::session::SessionState;

/// Refreshes the signed-in user's profile and stores it with the session.
pub async fn get_profile(state: &AppState) -> Result<UserProfile, AppError> {
    state.require_session()?;
    let profile = state.backend.profile().await?;

    let mut current = state.session();
    if let Some(session) = current.session_mut() {
        session.profile = Some(profile.clone());
    }
    state.replace_session(current)?;
    Ok(profile)
}

/// Makes `plate` the one history and latest-movement lookups use.
pub fn select_plate(state: &AppState, plate: &str) -> Result<SessionState, AppError> {
    let mut session = state.require_session()?;
    let wanted = plate.trim();

    // Keep the spelling the backend registered for the vehicle.
    let plate = match &session.profile {
        Some(profile) => profile
            .vehicles
            .iter()
            .map(|v| v.plate.trim())
            .find(|p| p.eq_ignore_ascii_case(wanted))
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "La placa {} no está registrada en tu perfil.",
                    wanted.to_uppercase()
                ))
            })?,
        None => wanted.to_string(),
    };

    session.plate = Some(plate);
    let role = state.session().role().ok_or_else(|| {
        AppError::Internal("session disappeared while selecting plate".to_string())
    })?;
    state.replace_session(SessionState::with_role(role, session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{auth, testing};
    use crate::session::repository::SessionRepository;

    #[tokio::test]
    async fn test_profile_requires_session() {
        let (app, _, _) = testing::state();
        assert!(matches!(get_profile(&app).await, Err(AppError::Auth(_))));

        auth::login(&app, "12345678", "admin").await.unwrap();
        let profile = get_profile(&app).await.unwrap();
        assert_eq!(profile.full_name, "Juan Pérez García");
        assert_eq!(profile.vehicles.len(), 2);
    }

    #[tokio::test]
    async fn test_select_plate_must_belong_to_profile() {
        let (app, _, _) = testing::state();
        auth::login(&app, "12345678", "admin").await.unwrap();

        let state = select_plate(&app, "a9b-567").unwrap();
        assert_eq!(state.plate(), Some("A9B-567"));
        assert_eq!(app.session().plate(), Some("A9B-567"));

        assert!(matches!(
            select_plate(&app, "ZZZ-000"),
            Err(AppError::Validation(_))
        ));
        assert_eq!(app.session().plate(), Some("A9B-567"));
    }

    #[tokio::test]
    async fn test_select_plate_keeps_profile_spelling() {
        let (app, _, sessions) = testing::state();
        auth::login(&app, "12345678", "admin").await.unwrap();

        let mut current = app.session();
        if let Some(profile) = current.session_mut().and_then(|s| s.profile.as_mut()) {
            profile.vehicles[1].plate = "a9b-567".to_string();
        }
        *app.session.write() = current;

        let state = select_plate(&app, "A9B-567").unwrap();
        assert_eq!(state.plate(), Some("a9b-567"));
        assert_eq!(sessions.load().unwrap().plate(), Some("a9b-567"));
    }
}
