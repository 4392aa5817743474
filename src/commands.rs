//! Application operations as the UI calls them. Every command takes the shared
//! [`AppState`] and returns `Result<_, AppError>`, which serializes as
//! `{ type, message }` for display.

use parking_lot::RwLock;
use std::sync::Arc;

pub mod admin;
pub mod auth;
pub mod history;
pub mod parking;
pub mod profile;

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::providers::{self, ParkingBackend};
use crate::session::{FileSessionRepository, Session, SessionRepository, SessionState};

pub struct AppState {
    backend: Arc<dyn ParkingBackend>,
    sessions: Arc<dyn SessionRepository>,
    clock: Arc<dyn Clock>,
    session: RwLock<SessionState>,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn ParkingBackend>,
        sessions: Arc<dyn SessionRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            backend,
            sessions,
            clock,
            session: RwLock::new(SessionState::Anonymous),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let backend = providers::connect_with_clock(config, clock.clone())?;
        let sessions = Arc::new(FileSessionRepository::new(config.session_file()));
        Ok(Self::new(backend, sessions, clock))
    }

    pub fn backend(&self) -> &Arc<dyn ParkingBackend> {
        &self.backend
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn session(&self) -> SessionState {
        self.session.read().clone()
    }

    fn require_session(&self) -> Result<Session, AppError> {
        self.session
            .read()
            .session()
            .cloned()
            .ok_or_else(|| AppError::Auth("Debes iniciar sesión.".to_string()))
    }

    fn require_admin(&self) -> Result<Session, AppError> {
        let session = self.session.read();
        match &*session {
            SessionState::Admin(s) => Ok(s.clone()),
            SessionState::User(_) => Err(AppError::Auth(
                "Se requieren permisos de administrador.".to_string(),
            )),
            SessionState::Anonymous => Err(AppError::Auth("Debes iniciar sesión.".to_string())),
        }
    }

    /// Persists `state`, points the backend at its token and makes it current.
    fn replace_session(&self, state: SessionState) -> Result<SessionState, AppError> {
        self.sessions.save(&state)?;
        self.backend.set_token(state.token().map(str::to_string));
        *self.session.write() = state.clone();
        Ok(state)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::clock::FixedClock;
    use crate::mock::MockBackend;
    use crate::session::MemorySessionRepository;

    pub fn now() -> chrono::NaiveDateTime {
        chrono::NaiveDateTime::parse_from_str("2025-11-10 10:00", "%Y-%m-%d %H:%M").unwrap()
    }

    pub fn state() -> (AppState, Arc<MockBackend>, Arc<MemorySessionRepository>) {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(now()));
        let backend = Arc::new(MockBackend::new(clock.clone()));
        let sessions = Arc::new(MemorySessionRepository::new());
        let app = AppState::new(backend.clone(), sessions.clone(), clock);
        (app, backend, sessions)
    }
}
