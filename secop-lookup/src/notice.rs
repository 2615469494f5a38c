//! User-visible notices attached to a report
//!
//! Nothing in a lookup is fatal to the page. Failures and data-quality
//! problems become notices and the affected section is left out.

use serde::Serialize;

/// How the page should style a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// What the notice is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Dataset endpoint unreachable or returned an error status
    FetchFailed,
    /// Query returned zero records
    EmptyResult,
    /// An expected field is absent from the response shape
    MissingColumn,
    /// More than one supplier identity among the returned records
    AmbiguousIdentity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn fetch_failed(detail: impl std::fmt::Display) -> Self {
        Self {
            kind: NoticeKind::FetchFailed,
            severity: Severity::Error,
            message: format!("Error en la consulta: {}", detail),
        }
    }

    pub fn empty_result() -> Self {
        Self {
            kind: NoticeKind::EmptyResult,
            severity: Severity::Info,
            message: "No se encontraron datos para el proveedor ingresado.".to_string(),
        }
    }

    pub fn missing_column(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::MissingColumn,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn ambiguous_identity() -> Self {
        Self {
            kind: NoticeKind::AmbiguousIdentity,
            severity: Severity::Warning,
            message: "Existen múltiples razones sociales asociadas a este número de documento."
                .to_string(),
        }
    }
}
