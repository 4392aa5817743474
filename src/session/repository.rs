use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{Session, SessionState};
use crate::errors::AppError;
use crate::models::{Role, UserProfile};

pub const KEY_TOKEN: &str = "userToken";
pub const KEY_ROLE: &str = "userRole";
pub const KEY_PROFILE: &str = "userData";
pub const KEY_PLATE: &str = "userPlate";

/// Where the signed-in session survives between launches.
pub trait SessionRepository: Send + Sync {
    fn load(&self) -> Result<SessionState, AppError>;
    fn save(&self, state: &SessionState) -> Result<(), AppError>;
    fn clear(&self) -> Result<(), AppError>;
}

type Entries = BTreeMap<String, String>;

fn to_entries(state: &SessionState) -> Result<Entries, AppError> {
    let mut entries = Entries::new();
    let (Some(role), Some(session)) = (state.role(), state.session()) else {
        return Ok(entries);
    };

    entries.insert(KEY_TOKEN.to_string(), session.token.clone());
    entries.insert(KEY_ROLE.to_string(), role.as_str().to_string());
    if let Some(profile) = &session.profile {
        entries.insert(KEY_PROFILE.to_string(), serde_json::to_string(profile)?);
    }
    if let Some(plate) = &session.plate {
        entries.insert(KEY_PLATE.to_string(), plate.clone());
    }
    Ok(entries)
}

fn from_entries(entries: &Entries) -> SessionState {
    let Some(token) = entries.get(KEY_TOKEN).filter(|t| !t.is_empty()) else {
        return SessionState::Anonymous;
    };
    let Some(role) = entries.get(KEY_ROLE) else {
        log::warn!("Stored session has a token but no role, ignoring it");
        return SessionState::Anonymous;
    };

    let profile = entries
        .get(KEY_PROFILE)
        .and_then(|raw| match serde_json::from_str::<UserProfile>(raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                log::warn!("Stored profile is unreadable, dropping it: {}", e);
                None
            }
        });

    SessionState::with_role(
        Role::from_wire(role),
        Session {
            token: token.clone(),
            profile,
            plate: entries.get(KEY_PLATE).cloned(),
        },
    )
}

/// JSON key/value file under the app's data directory.
pub struct FileSessionRepository {
    path: PathBuf,
}

impl FileSessionRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Entries, AppError> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }
        let content = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                log::warn!("Session file {:?} is corrupt, starting fresh: {}", self.path, e);
                Ok(Entries::new())
            }
        }
    }
}

impl SessionRepository for FileSessionRepository {
    fn load(&self) -> Result<SessionState, AppError> {
        let state = from_entries(&self.read_entries()?);
        log::debug!("Loaded session from {:?} (role: {:?})", self.path, state.role());
        Ok(state)
    }

    fn save(&self, state: &SessionState) -> Result<(), AppError> {
        if !state.is_authenticated() {
            return self.clear();
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&to_entries(state)?)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            log::info!("Cleared stored session at {:?}", self.path);
        }
        Ok(())
    }
}

/// Keeps the session for the lifetime of the process only.
#[derive(Default)]
pub struct MemorySessionRepository {
    entries: Mutex<Entries>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionRepository for MemorySessionRepository {
    fn load(&self) -> Result<SessionState, AppError> {
        Ok(from_entries(&self.entries.lock()))
    }

    fn save(&self, state: &SessionState) -> Result<(), AppError> {
        *self.entries.lock() = to_entries(state)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        self.entries.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Vehicle;

    fn signed_in() -> SessionState {
        SessionState::User(Session {
            token: "tok-123".into(),
            profile: Some(UserProfile {
                id: "u1".into(),
                full_name: "Juan Pérez García".into(),
                dni: "12345678".into(),
                user_type: "Estudiante".into(),
                code: Some("2020-12345".into()),
                school: None,
                vehicles: vec![Vehicle {
                    plate: "V1X-234".into(),
                    model: "Toyota Corolla".into(),
                }],
            }),
            plate: Some("V1X-234".into()),
        })
    }

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("unsapark-test-{}", uuid::Uuid::new_v4()))
            .join("session.json")
    }

    #[test]
    fn test_memory_round_trip() {
        let repo = MemorySessionRepository::new();
        assert_eq!(repo.load().unwrap(), SessionState::Anonymous);

        repo.save(&signed_in()).unwrap();
        assert_eq!(repo.load().unwrap(), signed_in());

        repo.clear().unwrap();
        assert_eq!(repo.load().unwrap(), SessionState::Anonymous);
    }

    #[test]
    fn test_file_round_trip_uses_fixed_keys() {
        let path = temp_path();
        let repo = FileSessionRepository::new(&path);
        repo.save(&signed_in()).unwrap();

        let raw: Entries = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.get(KEY_TOKEN).map(String::as_str), Some("tok-123"));
        assert_eq!(raw.get(KEY_ROLE).map(String::as_str), Some("USER"));
        assert!(raw.contains_key(KEY_PROFILE));

        assert_eq!(FileSessionRepository::new(&path).load().unwrap(), signed_in());

        repo.save(&SessionState::Anonymous).unwrap();
        assert!(!path.exists());
        assert_eq!(repo.load().unwrap(), SessionState::Anonymous);

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_token_without_role_is_anonymous() {
        let mut entries = Entries::new();
        entries.insert(KEY_TOKEN.to_string(), "orphan".to_string());
        assert_eq!(from_entries(&entries), SessionState::Anonymous);

        entries.insert(KEY_ROLE.to_string(), "ADMIN".to_string());
        entries.insert(KEY_PROFILE.to_string(), "{not json".to_string());
        let state = from_entries(&entries);
        assert!(state.is_admin());
        assert_eq!(state.session().unwrap().profile, None);
    }

    #[test]
    fn test_corrupt_file_loads_anonymous() {
        let path = temp_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "definitely not json").unwrap();
        let repo = FileSessionRepository::new(&path);
        assert_eq!(repo.load().unwrap(), SessionState::Anonymous);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
