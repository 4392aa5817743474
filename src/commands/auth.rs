use super::AppState;
use crate::errors::AppError;
use crate::models::{RegistrationOutcome, UserRequest};
use crate::session::SessionState;

pub async fn login(state: &AppState, dni: &str, password: &str) -> Result<SessionState, AppError> {
    let dni = dni.trim();
    if dni.is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Por favor, ingrese su DNI y contraseña.".to_string(),
        ));
    }

    let Some(grant) = state.backend.login(dni, password).await? else {
        return Err(AppError::Auth("DNI o contraseña incorrectos.".to_string()));
    };

    let mut session = SessionState::from_grant(grant);
    state.backend.set_token(session.token().map(str::to_string));

    // Some deployments only return the token; fetch the profile separately.
    if let Some(s) = session.session_mut() {
        if s.profile.is_none() {
            match state.backend.profile().await {
                Ok(profile) => s.profile = Some(profile),
                Err(e) => log::warn!("Signed in without a profile: {}", e),
            }
        }
    }

    log::info!("Signed in as {:?} (DNI {})", session.role(), dni);
    state.replace_session(session).inspect_err(|e| {
        log::error!("Could not store the new session: {}", e);
        state.backend.set_token(None);
    })
}

pub fn logout(state: &AppState) -> Result<(), AppError> {
    state.sessions.clear()?;
    state.backend.set_token(None);
    *state.session.write() = SessionState::Anonymous;
    log::info!("Signed out");
    Ok(())
}

/// Picks up the session stored by a previous launch, if any.
pub fn restore_session(state: &AppState) -> Result<SessionState, AppError> {
    let stored = state.sessions.load()?;
    if stored.is_authenticated() {
        log::info!("Restored {:?} session", stored.role());
    }
    state.backend.set_token(stored.token().map(str::to_string));
    *state.session.write() = stored.clone();
    Ok(stored)
}

/// Submits a registration request once both form steps validate.
pub async fn register(
    state: &AppState,
    request: &UserRequest,
) -> Result<RegistrationOutcome, AppError> {
    request.validate()?;

    let outcome = state.backend.register(request).await?;
    if outcome.success {
        log::info!("Registration request sent for DNI {}", request.dni);
    } else {
        log::info!(
            "Registration refused for DNI {}: {}",
            request.dni,
            outcome.msg.as_deref().unwrap_or("sin detalle")
        );
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use crate::clock::{Clock, FixedClock};
    use crate::mock::MockBackend;
    use crate::models::Role;
    use crate::providers::ParkingBackend;
    use crate::session::SessionRepository;
    use std::sync::Arc;

    /// A store whose disk is always full.
    struct ReadOnlyRepository;

    impl SessionRepository for ReadOnlyRepository {
        fn load(&self) -> Result<SessionState, AppError> {
            Ok(SessionState::Anonymous)
        }

        fn save(&self, _state: &SessionState) -> Result<(), AppError> {
            Err(AppError::Storage("No space left on device".to_string()))
        }

        fn clear(&self) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_empty_credentials_skip_backend() {
        let (app, _, _) = testing::state();
        let err = login(&app, "  ", "admin").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Por favor, ingrese su DNI y contraseña."
        );
        assert!(matches!(
            login(&app, "12345678", "").await,
            Err(AppError::Validation(_))
        ));
        assert!(!app.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let (app, _, sessions) = testing::state();
        let err = login(&app, "12345678", "nope").await.unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
        assert_eq!(sessions.load().unwrap(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_login_persists_and_logout_clears() {
        let (app, _, sessions) = testing::state();
        let state = login(&app, "12345678", "admin").await.unwrap();
        assert_eq!(state.role(), Some(Role::User));
        assert_eq!(state.plate(), Some("V1X-234"));
        assert_eq!(sessions.load().unwrap(), state);

        logout(&app).unwrap();
        assert_eq!(app.session(), SessionState::Anonymous);
        assert_eq!(sessions.load().unwrap(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_restore_reuses_token() {
        let (app, backend, sessions) = testing::state();
        let state = login(&app, "00000000", "admin").await.unwrap();
        assert!(state.is_admin());

        // A fresh process: same store, backend token unknown to the app yet.
        backend.set_token(None);
        *app.session.write() = SessionState::Anonymous;

        let restored = restore_session(&app).unwrap();
        assert_eq!(restored, sessions.load().unwrap());
        assert!(crate::commands::admin::pending_requests(&app).await.is_ok());
    }

    #[tokio::test]
    async fn test_register_validates_before_sending() {
        let (app, _, _) = testing::state();
        let mut request = crate::mock::fixtures::requests().remove(1);
        request.id = None;
        request.dni = "70001122".to_string();
        assert!(matches!(
            register(&app, &request).await,
            Err(AppError::Validation(_))
        ));

        request.password = "secreto".to_string();
        let outcome = register(&app, &request).await.unwrap();
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_backend_signed_out() {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(testing::now()));
        let backend = Arc::new(MockBackend::new(clock.clone()));
        let app = AppState::new(backend.clone(), Arc::new(ReadOnlyRepository), clock);

        let err = login(&app, "12345678", "admin").await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(app.session(), SessionState::Anonymous);
        assert!(matches!(backend.profile().await, Err(AppError::Auth(_))));
    }
}
