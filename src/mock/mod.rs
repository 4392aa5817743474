//! In-memory backend used when no live API is configured.
//!
//! History is filtered and sliced the same way the remote endpoint pages it,
//! so the rest of the client cannot tell the two apart.

pub mod fixtures;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::config::MOCK_PAGE_SIZE;
use crate::errors::AppError;
use crate::history::{HistoryFilter, HistoryPage, RawHistoryRecord, Timestamp};
use crate::models::{
    LoginGrant, ParkingStatus, RegistrationOutcome, RequestStatus, Role, UserProfile, UserRequest,
};
use crate::providers::{BackendKind, ParkingBackend};

struct MockStore {
    history: Vec<RawHistoryRecord>,
    requests: Vec<UserRequest>,
    /// token -> (dni, role)
    sessions: HashMap<String, (String, Role)>,
}

pub struct MockBackend {
    store: Mutex<MockStore>,
    token: RwLock<Option<String>>,
    clock: Arc<dyn Clock>,
    latency: Duration,
    history_calls: AtomicUsize,
}

impl MockBackend {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Mutex::new(MockStore {
                history: fixtures::history(),
                requests: fixtures::requests(),
                sessions: HashMap::new(),
            }),
            token: RwLock::new(None),
            clock,
            latency: Duration::ZERO,
            history_calls: AtomicUsize::new(0),
        }
    }

    /// Delay every call, mimicking a slow network.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::Relaxed)
    }

    pub fn history_len(&self, plate: &str) -> usize {
        self.store
            .lock()
            .history
            .iter()
            .filter(|r| r.plate.as_deref() == Some(plate))
            .count()
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn current_identity(&self) -> Result<(String, Role), AppError> {
        let token = self
            .token
            .read()
            .clone()
            .ok_or_else(|| AppError::Auth("Sesión no iniciada".to_string()))?;
        self.store
            .lock()
            .sessions
            .get(&token)
            .cloned()
            .ok_or_else(|| AppError::Auth("Token inválido o expirado".to_string()))
    }

    fn require_admin(&self) -> Result<(), AppError> {
        match self.current_identity()? {
            (_, Role::Admin) => Ok(()),
            _ => Err(AppError::Auth(
                "Se requieren permisos de administrador".to_string(),
            )),
        }
    }
}

#[async_trait]
impl ParkingBackend for MockBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Mock
    }

    fn name(&self) -> &str {
        "Datos de prueba"
    }

    fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    async fn login(&self, dni: &str, password: &str) -> Result<Option<LoginGrant>, AppError> {
        self.simulate_latency().await;

        let Some(account) = fixtures::ACCOUNTS
            .iter()
            .find(|a| a.dni == dni && a.password == password)
        else {
            log::info!("Mock login rejected for DNI {}", dni);
            return Ok(None);
        };

        let token = format!("mock-{}", uuid::Uuid::new_v4());
        self.store
            .lock()
            .sessions
            .insert(token.clone(), (account.dni.to_string(), account.role));

        Ok(Some(LoginGrant {
            token,
            role: account.role,
            profile: fixtures::profile_for(account.dni),
        }))
    }

    async fn register(&self, request: &UserRequest) -> Result<RegistrationOutcome, AppError> {
        self.simulate_latency().await;

        let mut store = self.store.lock();
        let duplicate = store
            .requests
            .iter()
            .any(|r| r.dni == request.dni && r.status != RequestStatus::Rejected);
        if duplicate {
            return Ok(RegistrationOutcome {
                success: false,
                msg: Some("Ya existe una solicitud para este DNI.".to_string()),
            });
        }

        let mut stored = request.clone();
        stored.id = Some(uuid::Uuid::new_v4().to_string());
        stored.status = RequestStatus::Pending;
        stored.password.clear();
        log::info!(
            "Mock registration stored for {} ({})",
            stored.full_name,
            stored.vehicle.plate
        );
        store.requests.push(stored);

        Ok(RegistrationOutcome {
            success: true,
            msg: None,
        })
    }

    async fn parking_status(&self) -> Result<ParkingStatus, AppError> {
        self.simulate_latency().await;
        Ok(ParkingStatus {
            areas: fixtures::areas(),
        })
    }

    async fn profile(&self) -> Result<UserProfile, AppError> {
        self.simulate_latency().await;
        let (dni, _) = self.current_identity()?;
        fixtures::profile_for(&dni)
            .ok_or_else(|| AppError::NotFound(format!("perfil para DNI {}", dni)))
    }

    async fn history_page(
        &self,
        plate: &str,
        page: u32,
        filter: HistoryFilter,
    ) -> Result<HistoryPage, AppError> {
        self.history_calls.fetch_add(1, Ordering::Relaxed);
        self.simulate_latency().await;

        let today = self.clock.today();
        let matching: Vec<RawHistoryRecord> = self
            .store
            .lock()
            .history
            .iter()
            .filter(|r| r.plate.as_deref() == Some(plate))
            .filter(|r| {
                r.entry
                    .as_deref()
                    .and_then(Timestamp::parse)
                    .is_some_and(|t| filter.matches(t.date(), today))
            })
            .cloned()
            .collect();

        let total = matching.len();
        let pages = total.div_ceil(MOCK_PAGE_SIZE);
        let start = (page.max(1) as usize - 1) * MOCK_PAGE_SIZE;

        Ok(HistoryPage {
            records: matching
                .into_iter()
                .skip(start)
                .take(MOCK_PAGE_SIZE)
                .collect(),
            total: Some(total as u64),
            pages: Some(pages as u32),
        })
    }

    async fn pending_requests(&self) -> Result<Vec<UserRequest>, AppError> {
        self.simulate_latency().await;
        self.require_admin()?;
        Ok(self
            .store
            .lock()
            .requests
            .iter()
            .filter(|r| r.is_pending())
            .cloned()
            .collect())
    }

    async fn review_request(
        &self,
        request_id: &str,
        status: RequestStatus,
    ) -> Result<bool, AppError> {
        self.simulate_latency().await;
        self.require_admin()?;

        let mut store = self.store.lock();
        match store
            .requests
            .iter_mut()
            .find(|r| r.id.as_deref() == Some(request_id))
        {
            Some(request) => {
                request.status = status;
                log::info!("Mock request {} marked {}", request_id, status.as_str());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
