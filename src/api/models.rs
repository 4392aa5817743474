//! Response envelopes of the UNSAPark REST API and the shape-tolerant readers
//! that turn them into client types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::history::{HistoryPage, RawHistoryRecord};
use crate::models::{LoginGrant, ParkingStatus, Role, UserProfile, UserRequest};

#[derive(Debug, Serialize)]
pub struct LoginBody<'a> {
    pub dni: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ReviewBody<'a> {
    #[serde(rename = "statusSolicitud")]
    pub status: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(alias = "accessToken")]
    token: String,
    #[serde(default, alias = "rol")]
    role: Option<String>,
    #[serde(default, alias = "usuario")]
    user: Option<Value>,
}

/// Returns the array either at the root or under one of `keys`.
pub fn extract_list<'a>(data: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    if let Some(items) = data.as_array() {
        return Some(items);
    }
    let obj = data.as_object()?;
    keys.iter().find_map(|k| obj.get(*k).and_then(|v| v.as_array()))
}

fn as_u64(value: Option<&Value>) -> Option<u64> {
    value.and_then(|v| v.as_u64().or_else(|| v.as_str()?.parse().ok()))
}

/// `{ data: [...] }` or a bare array; any other shape is an empty page.
pub fn history_page_from_value(data: &Value) -> HistoryPage {
    let Some(items) = extract_list(data, &["data"]) else {
        log::debug!("Unexpected history payload shape, treating as empty page");
        return HistoryPage::empty();
    };

    HistoryPage {
        records: items.iter().filter_map(RawHistoryRecord::from_json).collect(),
        total: as_u64(data.get("total")),
        pages: as_u64(data.get("pages").or_else(|| data.get("totalPages")))
            .and_then(|p| u32::try_from(p).ok()),
    }
}

/// A record, a record wrapped in `item`, or nothing at all.
pub fn latest_from_value(data: &Value) -> Option<RawHistoryRecord> {
    let inner = match data.get("item") {
        Some(item) => item,
        None => data,
    };
    let record = RawHistoryRecord::from_json(inner)?;
    // `{}` and `{ "msg": "..." }` carry no movement.
    if record.id.is_none() && record.entry.is_none() {
        return None;
    }
    Some(record)
}

pub fn parking_status_from_value(data: Value) -> Result<ParkingStatus, AppError> {
    let items = extract_list(&data, &["areas", "data"])
        .ok_or_else(|| AppError::InvalidResponse("parking status without areas".to_string()))?;
    let areas = items
        .iter()
        .map(|raw| serde_json::from_value(raw.clone()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ParkingStatus { areas })
}

pub fn profile_from_value(data: Value) -> Result<UserProfile, AppError> {
    let inner = ["user", "usuario", "data"]
        .iter()
        .find_map(|k| data.get(*k).filter(|v| v.is_object()).cloned())
        .unwrap_or(data);
    Ok(serde_json::from_value(inner)?)
}

pub fn login_grant_from_value(data: Value) -> Result<LoginGrant, AppError> {
    let resp: LoginResponse = serde_json::from_value(data)?;
    let profile = match resp.user {
        Some(user) => match serde_json::from_value::<UserProfile>(user) {
            Ok(profile) => Some(profile),
            Err(e) => {
                log::warn!("Login response carried an unreadable profile: {}", e);
                None
            }
        },
        None => None,
    };
    Ok(LoginGrant {
        token: resp.token,
        role: resp
            .role
            .as_deref()
            .map(Role::from_wire)
            .unwrap_or(Role::User),
        profile,
    })
}

pub fn requests_from_value(data: &Value) -> Vec<UserRequest> {
    extract_list(data, &["data", "requests", "solicitudes"])
        .map(|items| {
            items
                .iter()
                .filter_map(|raw| match serde_json::from_value(raw.clone()) {
                    Ok(request) => Some(request),
                    Err(e) => {
                        log::warn!("Skipping unreadable registration request: {}", e);
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}
