use axum::http::StatusCode;
use thiserror::Error;

/// Failures of the edit controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("field '{field}' is missing or invalid")]
    Validation { field: &'static str },

    #[error("discount '{id}' not found")]
    NotFound { id: String },

    #[error("no discount selected")]
    NoTarget,

    #[error("failed to write '{key}': {message}")]
    Storage { key: String, message: String },
}

impl EditError {
    pub fn user_message(&self) -> &'static str {
        match self {
            EditError::Validation { field: "storeName" } => "Falta el nombre de la tienda.",
            EditError::Validation { field: "discountValue" } => "Falta el descuento.",
            EditError::Validation { field: "days" } => "Elegí al menos un día.",
            EditError::Validation { field: "entity" } => "La entidad elegida no existe.",
            EditError::Validation { .. } => "Revisá los datos del formulario.",
            EditError::NotFound { .. } => "No se encontró el descuento a editar.",
            EditError::NoTarget => "Elegí un descuento de abajo para borrar.",
            EditError::Storage { .. } => "No se pudo guardar. Intentá de nuevo.",
        }
    }
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image payload is empty")]
    Empty,

    #[error("unsupported image type '{0}'")]
    UnsupportedType(String),

    #[error("image encoding was interrupted: {0}")]
    Interrupted(String),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifications unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<EditError> for AppError {
    fn from(err: EditError) -> Self {
        let message = err.user_message();
        match err {
            EditError::Validation { .. } | EditError::NoTarget => Self::bad_request(message),
            EditError::NotFound { .. } => Self::not_found(message),
            EditError::Storage { .. } => Self::internal(message),
        }
    }
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Interrupted(_) => Self::internal(err.to_string()),
            _ => Self::bad_request(err.to_string()),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
