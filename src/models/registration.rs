use serde::{Deserialize, Serialize};

use super::de;
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RequestStatus {
    #[default]
    #[serde(rename = "PENDIENTE")]
    Pending,
    #[serde(rename = "APROBADO")]
    Approved,
    #[serde(rename = "RECHAZADO")]
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RequestStatus::Pending => "PENDIENTE",
            RequestStatus::Approved => "APROBADO",
            RequestStatus::Rejected => "RECHAZADO",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentCondition {
    #[default]
    Estudiante,
    Docente,
    Administrativo,
    Externo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PersonalData {
    #[serde(rename = "dependencia", default)]
    pub dependency: String,
    #[serde(rename = "cargo", default)]
    pub position: String,
    /// `YYYY-MM-DD` as picked in the registration form.
    #[serde(rename = "fechaIngreso", default)]
    pub start_date: String,
    #[serde(rename = "condicionLaboral", default)]
    pub employment: EmploymentCondition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RequestVehicle {
    #[serde(rename = "marca", default)]
    pub brand: String,
    #[serde(rename = "modelo", default)]
    pub model: String,
    #[serde(rename = "placa", default)]
    pub plate: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Documents {
    #[serde(default)]
    pub dni_url: String,
    #[serde(rename = "licenciaUrl", default)]
    pub license_url: String,
}

/// A registration request as submitted by an applicant and reviewed by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    #[serde(
        rename = "_id",
        alias = "id",
        default,
        deserialize_with = "de::option_string_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(rename = "nombreCompleto")]
    pub full_name: String,
    #[serde(deserialize_with = "de::string_from_any")]
    pub dni: String,
    #[serde(rename = "telefono", default)]
    pub phone: String,
    #[serde(rename = "statusSolicitud", default)]
    pub status: RequestStatus,
    #[serde(rename = "datosPersonales", default)]
    pub personal: PersonalData,
    #[serde(rename = "vehiculo", default)]
    pub vehicle: RequestVehicle,
    #[serde(rename = "documentos", default)]
    pub documents: Documents,
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

impl UserRequest {
    /// First form step: identity and affiliation.
    pub fn validate_personal(&self) -> Result<(), AppError> {
        if blank(&self.full_name)
            || blank(&self.dni)
            || blank(&self.email)
            || blank(&self.password)
            || blank(&self.personal.dependency)
        {
            return Err(AppError::Validation(
                "Por favor completa todos los datos obligatorios.".to_string(),
            ));
        }
        Ok(())
    }

    /// Second form step: vehicle plate and both uploaded documents.
    pub fn validate_vehicle(&self) -> Result<(), AppError> {
        if blank(&self.vehicle.plate)
            || blank(&self.documents.dni_url)
            || blank(&self.documents.license_url)
        {
            return Err(AppError::Validation(
                "Debes ingresar la placa y adjuntar ambas fotos.".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.validate_personal()?;
        self.validate_vehicle()
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

/// Backend answer to a registration submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationOutcome {
    pub success: bool,
    #[serde(default)]
    pub msg: Option<String>,
}
