//! Static data served by the mock backend.

use crate::history::RawHistoryRecord;
use crate::models::{
    Area, AreaStatus, Documents, EmploymentCondition, Gate, GateStatus, PersonalData, Role,
    RequestVehicle, UserProfile, UserRequest, Vehicle,
};

pub struct MockAccount {
    pub dni: &'static str,
    pub password: &'static str,
    pub role: Role,
}

pub const ACCOUNTS: &[MockAccount] = &[
    MockAccount {
        dni: "12345678",
        password: "admin",
        role: Role::User,
    },
    MockAccount {
        dni: "00000000",
        password: "admin",
        role: Role::Admin,
    },
];

fn gate(id: &str, name: &str, status: GateStatus, spots: (u32, u32), at: (f64, f64)) -> Gate {
    Gate {
        id: id.to_string(),
        name: name.to_string(),
        status,
        total_spots: Some(spots.0),
        occupied_spots: Some(spots.1),
        latitude: Some(at.0),
        longitude: Some(at.1),
    }
}

pub fn areas() -> Vec<Area> {
    vec![
        Area {
            id: "ing".to_string(),
            name: "Área Ingenierías".to_string(),
            total_spots: 50,
            occupied_spots: 22,
            status: AreaStatus::Open,
            message: String::new(),
            gates: vec![
                gate("ing_pauc", "Puerta Paucarpata", GateStatus::Open, (20, 9), (-16.4047, -71.5254)),
                gate("ing_inde", "Puerta Independencia", GateStatus::Open, (20, 13), (-16.4039, -71.5239)),
                gate("ing_vene", "Puerta Venezuela", GateStatus::Maintenance, (10, 0), (-16.4061, -71.5247)),
            ],
        },
        Area {
            id: "soc".to_string(),
            name: "Área Sociales".to_string(),
            total_spots: 50,
            occupied_spots: 48,
            status: AreaStatus::Open,
            message: "Pocos cupos disponibles".to_string(),
            gates: vec![gate(
                "soc_vene",
                "Puerta Venezuela",
                GateStatus::Open,
                (50, 48),
                (-16.4072, -71.5201),
            )],
        },
        Area {
            id: "bio".to_string(),
            name: "Área Biomédicas".to_string(),
            total_spots: 50,
            occupied_spots: 0,
            status: AreaStatus::Closed,
            message: "Cerrado por domingo".to_string(),
            gates: vec![
                gate("bio_virg", "Puerta Virgen del Pilar", GateStatus::Closed, (25, 0), (-16.4123, -71.5302)),
                gate("bio_alc", "Puerta Daniel Alcides", GateStatus::Closed, (25, 0), (-16.4131, -71.5288)),
            ],
        },
    ]
}

pub fn profile_for(dni: &str) -> Option<UserProfile> {
    match dni {
        "12345678" => Some(UserProfile {
            id: "u1".to_string(),
            full_name: "Juan Pérez García".to_string(),
            dni: dni.to_string(),
            user_type: "Estudiante".to_string(),
            code: Some("2020-12345".to_string()),
            school: Some("Ingeniería de Sistemas".to_string()),
            vehicles: vec![
                Vehicle {
                    plate: "V1X-234".to_string(),
                    model: "Toyota Corolla".to_string(),
                },
                Vehicle {
                    plate: "A9B-567".to_string(),
                    model: "Honda Civic".to_string(),
                },
            ],
        }),
        "00000000" => Some(UserProfile {
            id: "adm1".to_string(),
            full_name: "Oficina de Seguridad UNSA".to_string(),
            dni: dni.to_string(),
            user_type: "Administrativo".to_string(),
            code: None,
            school: None,
            vehicles: Vec::new(),
        }),
        _ => None,
    }
}

fn movement(
    id: &str,
    area: Option<&str>,
    gate: &str,
    plate: &str,
    entry: &str,
    exit: Option<&str>,
) -> RawHistoryRecord {
    RawHistoryRecord {
        id: Some(id.to_string()),
        area: area.map(str::to_string),
        gate: Some(gate.to_string()),
        plate: Some(plate.to_string()),
        entry: Some(entry.to_string()),
        exit: exit.map(str::to_string),
    }
}

/// Newest first, the order the backend pages them in.
pub fn history() -> Vec<RawHistoryRecord> {
    const P: &str = "V1X-234";
    vec![
        movement("1", Some("Ingenierías"), "Puerta Paucarpata", P, "2025-11-10 08:30", Some("2025-11-10 14:45")),
        movement("2", Some("Sociales"), "Puerta Venezuela", P, "2025-11-09 09:15", Some("2025-11-09 16:20")),
        movement("3", Some("Biomédicas"), "Puerta Virgen del Pilar", P, "2025-11-08 07:45", Some("2025-11-08 13:30")),
        movement("4", Some("Ingenierías"), "Puerta Independencia", P, "2025-11-08 15:10", Some("2025-11-08 18:05")),
        movement("5", Some("Sociales"), "Puerta Venezuela", P, "2025-11-06 10:00", Some("2025-11-06 12:40")),
        movement("6", Some("Ingenierías"), "Puerta Paucarpata", P, "2025-11-05T07:55:00.000Z", Some("2025-11-05T13:05:00.000Z")),
        movement("7", None, "Puerta Daniel Alcides", P, "2025-11-04 08:20", Some("2025-11-04 11:00")),
        movement("8", Some("Ingenierías"), "Puerta Paucarpata", P, "2025-11-03 09:00", Some("2025-11-03 17:30")),
        movement("9", Some("Sociales"), "Puerta Venezuela", P, "2025-11-02 08:45", Some("2025-11-02 10:15")),
        movement("10", Some("Ingenierías"), "Puerta Independencia", P, "2025-11-01 07:30", Some("2025-11-01 12:00")),
        movement("11", Some("Biomédicas"), "Puerta Virgen del Pilar", P, "2025-10-20 08:10", Some("2025-10-20 09:50")),
        movement("12", Some("Ingenierías"), "Puerta Paucarpata", P, "2025-10-02 14:00", Some("2025-10-02 18:30")),
        movement("13", Some("Sociales"), "Puerta Venezuela", "A9B-567", "2025-11-10 09:40", None),
        movement("14", Some("Ingenierías"), "Puerta Independencia", "A9B-567", "2025-11-07 08:00", Some("2025-11-07 13:00")),
    ]
}

pub fn requests() -> Vec<UserRequest> {
    vec![
        UserRequest {
            id: Some("req-1".to_string()),
            email: "maria.flores@unsa.edu.pe".to_string(),
            full_name: "María Flores Ccama".to_string(),
            dni: "45678912".to_string(),
            phone: "958112233".to_string(),
            personal: PersonalData {
                dependency: "Facultad de Ciencias Sociales".to_string(),
                position: "Docente".to_string(),
                start_date: "2019-03-15".to_string(),
                employment: EmploymentCondition::Docente,
            },
            vehicle: RequestVehicle {
                brand: "Hyundai".to_string(),
                model: "Accent".to_string(),
                plate: "C3D-456".to_string(),
                color: "Gris".to_string(),
            },
            documents: Documents {
                dni_url: "https://media.unsapark.pe/docs/req-1-dni.jpg".to_string(),
                license_url: "https://media.unsapark.pe/docs/req-1-lic.jpg".to_string(),
            },
            ..Default::default()
        },
        UserRequest {
            id: Some("req-2".to_string()),
            email: "luis.mamani@unsa.edu.pe".to_string(),
            full_name: "Luis Mamani Torres".to_string(),
            dni: "73456120".to_string(),
            phone: "945667788".to_string(),
            personal: PersonalData {
                dependency: "Escuela de Ingeniería Civil".to_string(),
                position: "Estudiante".to_string(),
                start_date: "2021-04-01".to_string(),
                employment: EmploymentCondition::Estudiante,
            },
            vehicle: RequestVehicle {
                brand: "Suzuki".to_string(),
                model: "Swift".to_string(),
                plate: "F8G-210".to_string(),
                color: "Azul".to_string(),
            },
            documents: Documents {
                dni_url: "https://media.unsapark.pe/docs/req-2-dni.jpg".to_string(),
                license_url: "https://media.unsapark.pe/docs/req-2-lic.jpg".to_string(),
            },
            ..Default::default()
        },
    ]
}
