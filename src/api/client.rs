use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::models::*;
use crate::config::APP_NAME;
use crate::errors::AppError;
use crate::history::{HistoryFilter, HistoryPage, RawHistoryRecord};
use crate::models::{
    LoginGrant, ParkingStatus, RegistrationOutcome, RequestStatus, UserProfile, UserRequest,
};
use crate::providers::{BackendKind, ParkingBackend};

/// REST client for the UNSAPark backend.
pub struct ApiClient {
    base_url: String,
    client: Client,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", APP_NAME, env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<(StatusCode, Value), AppError> {
        let url = self.url(path);
        log::debug!("{} {} {:?}", method, url, params);

        let mut request = self.client.request(method, &url).query(params);
        let token = self.token.read().clone();
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let data = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(data) => data,
                Err(e) if status.is_success() => {
                    return Err(AppError::InvalidResponse(format!(
                        "JSON error at {}: {}",
                        url, e
                    )))
                }
                Err(_) => Value::String(text),
            }
        };

        Ok((status, data))
    }

    /// Like `send`, but every non-2xx answer becomes an error.
    async fn request_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Value, AppError> {
        let (status, data) = self.send(method, path, params, body).await?;
        if status.is_success() {
            return Ok(data);
        }

        let message = error_message(&data).unwrap_or_else(|| status.to_string());
        log::warn!("Request to {} failed ({}): {}", path, status, message);
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppError::Auth(message));
        }
        Err(AppError::Http {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value, AppError> {
        self.request_json::<()>(Method::GET, path, params, None)
            .await
    }
}

fn error_message(data: &Value) -> Option<String> {
    match data {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(obj) => ["msg", "message", "error"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(|v| v.as_str()))
            .map(str::to_string),
        _ => None,
    }
}

fn segment(raw: &str) -> String {
    urlencoding::encode(raw.trim()).into_owned()
}

#[async_trait]
impl ParkingBackend for ApiClient {
    fn kind(&self) -> BackendKind {
        BackendKind::Live
    }

    fn name(&self) -> &str {
        "UNSAPark API"
    }

    fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    async fn login(&self, dni: &str, password: &str) -> Result<Option<LoginGrant>, AppError> {
        let body = LoginBody { dni, password };
        let (status, data) = self
            .send(Method::POST, "/auth/login", &[], Some(&body))
            .await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::BAD_REQUEST {
            log::info!("Login rejected for DNI {} ({})", dni, status);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::Http {
                status: status.as_u16(),
                message: error_message(&data).unwrap_or_else(|| status.to_string()),
            });
        }

        login_grant_from_value(data).map(Some)
    }

    async fn register(&self, request: &UserRequest) -> Result<RegistrationOutcome, AppError> {
        let (status, data) = self
            .send(Method::POST, "/auth/register", &[], Some(request))
            .await?;

        // Rejections such as a duplicate DNI come back as 4xx with a message.
        if status.is_client_error() {
            return Ok(RegistrationOutcome {
                success: false,
                msg: error_message(&data),
            });
        }
        if !status.is_success() {
            return Err(AppError::Http {
                status: status.as_u16(),
                message: error_message(&data).unwrap_or_else(|| status.to_string()),
            });
        }

        match serde_json::from_value::<RegistrationOutcome>(data.clone()) {
            Ok(outcome) => Ok(outcome),
            Err(_) => Ok(RegistrationOutcome {
                success: true,
                msg: error_message(&data),
            }),
        }
    }

    async fn parking_status(&self) -> Result<ParkingStatus, AppError> {
        let data = self.get_json("/parking/status", &[]).await?;
        parking_status_from_value(data)
    }

    async fn profile(&self) -> Result<UserProfile, AppError> {
        let data = self.get_json("/users/me", &[]).await?;
        profile_from_value(data)
    }

    async fn history_page(
        &self,
        plate: &str,
        page: u32,
        filter: HistoryFilter,
    ) -> Result<HistoryPage, AppError> {
        let mut params = vec![("page", page.to_string())];
        params.extend(filter.query_params());

        let path = format!("/history/vehicle/{}", segment(plate));
        let data = self.get_json(&path, &params).await?;
        Ok(history_page_from_value(&data))
    }

    async fn latest_movement(&self, plate: &str) -> Result<Option<RawHistoryRecord>, AppError> {
        let path = format!("/history/latest/{}", segment(plate));
        let (status, data) = self.send::<()>(Method::GET, &path, &[], None).await?;

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::Http {
                status: status.as_u16(),
                message: error_message(&data).unwrap_or_else(|| status.to_string()),
            });
        }

        Ok(latest_from_value(&data).filter(|r| {
            r.exit.as_deref().is_none_or(|e| e.trim().is_empty())
        }))
    }

    async fn pending_requests(&self) -> Result<Vec<UserRequest>, AppError> {
        let params = [("status", RequestStatus::Pending.as_str().to_string())];
        let data = self.get_json("/admin/requests", &params).await?;
        Ok(requests_from_value(&data)
            .into_iter()
            .filter(UserRequest::is_pending)
            .collect())
    }

    async fn review_request(
        &self,
        request_id: &str,
        status: RequestStatus,
    ) -> Result<bool, AppError> {
        let path = format!("/admin/requests/{}", segment(request_id));
        let body = ReviewBody {
            status: status.as_str(),
        };
        let (code, data) = self
            .send(Method::PATCH, &path, &[], Some(&body))
            .await?;

        match code {
            c if c.is_success() => {
                log::info!("Request {} marked {}", request_id, status.as_str());
                Ok(true)
            }
            StatusCode::NOT_FOUND => Ok(false),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::Auth(
                error_message(&data).unwrap_or_else(|| code.to_string()),
            )),
            _ => Err(AppError::Http {
                status: code.as_u16(),
                message: error_message(&data).unwrap_or_else(|| code.to_string()),
            }),
        }
    }
}
