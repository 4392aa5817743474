pub mod de;
pub mod registration;

use serde::{Deserialize, Serialize};

pub use registration::{
    Documents, EmploymentCondition, PersonalData, RegistrationOutcome, RequestStatus,
    RequestVehicle, UserRequest,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateStatus {
    Open,
    Closed,
    Maintenance,
}

impl GateStatus {
    /// Label shown next to a gate, e.g. "Cerrada (MAINTENANCE)".
    pub fn label(&self) -> String {
        match self {
            GateStatus::Open => "Abierta".to_string(),
            GateStatus::Closed => "Cerrada (CLOSED)".to_string(),
            GateStatus::Maintenance => "Cerrada (MAINTENANCE)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AreaStatus {
    Open,
    Closed,
    Full,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    Plenty,
    Few,
    None,
}

impl Availability {
    pub fn from_available(available: u32) -> Self {
        if available > 10 {
            Availability::Plenty
        } else if available > 0 {
            Availability::Few
        } else {
            Availability::None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gate {
    #[serde(alias = "_id", deserialize_with = "de::string_from_any")]
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    pub status: GateStatus,
    #[serde(
        rename = "cuposTotales",
        default,
        deserialize_with = "de::option_u32_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_spots: Option<u32>,
    #[serde(
        rename = "cuposOcupados",
        default,
        deserialize_with = "de::option_u32_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub occupied_spots: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Gate {
    pub fn is_open(&self) -> bool {
        self.status == GateStatus::Open
    }

    /// Free spots at this gate, when the backend reports per-gate counters.
    pub fn available_spots(&self) -> Option<u32> {
        match (self.total_spots, self.occupied_spots) {
            (Some(total), Some(occupied)) => Some(total.saturating_sub(occupied)),
            _ => None,
        }
    }

    pub fn has_spots(&self) -> bool {
        self.available_spots().is_some_and(|n| n > 0)
    }

    /// Destination for routing; `None` when the gate has no registered position.
    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates {
            latitude: self.latitude?,
            longitude: self.longitude?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    #[serde(alias = "_id", deserialize_with = "de::string_from_any")]
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "cuposTotales", deserialize_with = "de::u32_from_any")]
    pub total_spots: u32,
    #[serde(rename = "cuposOcupados", deserialize_with = "de::u32_from_any")]
    pub occupied_spots: u32,
    pub status: AreaStatus,
    #[serde(rename = "mensaje", default)]
    pub message: String,
    #[serde(rename = "puertas", default)]
    pub gates: Vec<Gate>,
}

impl Area {
    pub fn available_spots(&self) -> u32 {
        self.total_spots.saturating_sub(self.occupied_spots)
    }

    pub fn availability(&self) -> Availability {
        Availability::from_available(self.available_spots())
    }

    pub fn is_open(&self) -> bool {
        self.status == AreaStatus::Open
    }

    pub fn gate(&self, gate_id: &str) -> Option<&Gate> {
        self.gates.iter().find(|g| g.id == gate_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingStatus {
    pub areas: Vec<Area>,
}

impl ParkingStatus {
    pub fn area(&self, area_id: &str) -> Option<&Area> {
        self.areas.iter().find(|a| a.id == area_id)
    }

    pub fn total_available(&self) -> u32 {
        self.areas
            .iter()
            .filter(|a| a.is_open())
            .map(Area::available_spots)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(rename = "placa")]
    pub plate: String,
    #[serde(rename = "modelo", default)]
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(alias = "_id", deserialize_with = "de::string_from_any")]
    pub id: String,
    #[serde(rename = "nombreCompleto")]
    pub full_name: String,
    #[serde(deserialize_with = "de::string_from_any")]
    pub dni: String,
    #[serde(rename = "tipoUsuario", default)]
    pub user_type: String,
    #[serde(rename = "codigo", default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(rename = "escuela", default, skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    #[serde(rename = "vehiculos", default)]
    pub vehicles: Vec<Vehicle>,
}

impl UserProfile {
    /// Plate used as the key for history and latest-movement lookups.
    pub fn primary_plate(&self) -> Option<&str> {
        self.vehicles
            .iter()
            .map(|v| v.plate.trim())
            .find(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// Backend roles other than an administrator are treated as regular users.
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "ADMIN" | "ADMINISTRADOR" => Role::Admin,
            _ => Role::User,
        }
    }
}

/// Successful authentication as reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginGrant {
    pub token: String,
    pub role: Role,
    pub profile: Option<UserProfile>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_availability_thresholds() {
        assert_eq!(Availability::from_available(28), Availability::Plenty);
        assert_eq!(Availability::from_available(11), Availability::Plenty);
        assert_eq!(Availability::from_available(10), Availability::Few);
        assert_eq!(Availability::from_available(1), Availability::Few);
        assert_eq!(Availability::from_available(0), Availability::None);
    }

    #[test]
    fn test_area_from_backend_json() {
        let area: Area = serde_json::from_value(json!({
            "_id": 7,
            "nombre": "Área Sociales",
            "cuposTotales": "50",
            "cuposOcupados": 48,
            "status": "OPEN",
            "puertas": [
                { "id": "soc_vene", "nombre": "Puerta Venezuela", "status": "OPEN",
                  "cuposTotales": 20, "cuposOcupados": 20,
                  "latitude": -16.40, "longitude": -71.52 }
            ]
        }))
        .unwrap();

        assert_eq!(area.id, "7");
        assert_eq!(area.message, "");
        assert_eq!(area.available_spots(), 2);
        assert_eq!(area.availability(), Availability::Few);

        let gate = area.gate("soc_vene").unwrap();
        assert!(gate.is_open());
        assert_eq!(gate.available_spots(), Some(0));
        assert!(!gate.has_spots());
        assert!(gate.coordinates().is_some());
    }

    #[test]
    fn test_occupancy_never_underflows() {
        let area = Area {
            id: "x".into(),
            name: "X".into(),
            total_spots: 10,
            occupied_spots: 12,
            status: AreaStatus::Full,
            message: String::new(),
            gates: vec![],
        };
        assert_eq!(area.available_spots(), 0);
        assert_eq!(area.availability(), Availability::None);
    }

    #[test]
    fn test_role_from_wire() {
        assert_eq!(Role::from_wire("admin"), Role::Admin);
        assert_eq!(Role::from_wire("ADMIN"), Role::Admin);
        assert_eq!(Role::from_wire("USER"), Role::User);
        assert_eq!(Role::from_wire("ESTUDIANTE"), Role::User);
    }

    #[test]
    fn test_primary_plate_skips_blank() {
        let profile = UserProfile {
            id: "u1".into(),
            full_name: "Juan".into(),
            dni: "12345678".into(),
            user_type: "Estudiante".into(),
            code: None,
            school: None,
            vehicles: vec![
                Vehicle {
                    plate: "  ".into(),
                    model: "?".into(),
                },
                Vehicle {
                    plate: "V1X-234".into(),
                    model: "Toyota Corolla".into(),
                },
            ],
        };
        assert_eq!(profile.primary_plate(), Some("V1X-234"));
    }
}
