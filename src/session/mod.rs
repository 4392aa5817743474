pub mod repository;

use serde::{Deserialize, Serialize};

use crate::models::{LoginGrant, Role, UserProfile};

pub use repository::{FileSessionRepository, MemorySessionRepository, SessionRepository};

/// Credentials and profile of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub profile: Option<UserProfile>,
    /// Plate chosen explicitly; falls back to the profile's first vehicle.
    pub plate: Option<String>,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            profile: None,
            plate: None,
        }
    }

    pub fn plate(&self) -> Option<&str> {
        self.plate
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .or_else(|| self.profile.as_ref().and_then(UserProfile::primary_plate))
    }
}

/// Who is using the client. Being signed in without a role is not representable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "session")]
pub enum SessionState {
    #[default]
    Anonymous,
    User(Session),
    Admin(Session),
}

impl SessionState {
    pub fn from_grant(grant: LoginGrant) -> Self {
        let session = Session {
            token: grant.token,
            profile: grant.profile,
            plate: None,
        };
        Self::with_role(grant.role, session)
    }

    pub fn with_role(role: Role, session: Session) -> Self {
        match role {
            Role::User => SessionState::User(session),
            Role::Admin => SessionState::Admin(session),
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            SessionState::Anonymous => None,
            SessionState::User(_) => Some(Role::User),
            SessionState::Admin(_) => Some(Role::Admin),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Anonymous => None,
            SessionState::User(s) | SessionState::Admin(s) => Some(s),
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        match self {
            SessionState::Anonymous => None,
            SessionState::User(s) | SessionState::Admin(s) => Some(s),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, SessionState::Anonymous)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, SessionState::Admin(_))
    }

    pub fn token(&self) -> Option<&str> {
        self.session().map(|s| s.token.as_str())
    }

    pub fn plate(&self) -> Option<&str> {
        self.session().and_then(Session::plate)
    }
}
