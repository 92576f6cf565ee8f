use crate::category::UnknownCategory;
use crate::clipboard::CopyError;
use crate::form::FormError;
use crate::storage::StorageError;
use crate::store::StaleRevision;
use axum::http::StatusCode;
use tracing::warn;

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

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        Self::internal(err)
    }
}

impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        let status = match &err {
            FormError::ModeChanged { .. } => StatusCode::CONFLICT,
            FormError::UnknownField { .. } | FormError::NotEditing(_) => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<UnknownCategory> for AppError {
    fn from(err: UnknownCategory) -> Self {
        Self::not_found(err.to_string())
    }
}

impl From<StaleRevision> for AppError {
    fn from(err: StaleRevision) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: err.to_string(),
        }
    }
}

impl From<CopyError> for AppError {
    fn from(err: CopyError) -> Self {
        let status = match &err {
            CopyError::EmptyField(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CopyError::Platform(detail) => {
                warn!("clipboard write failed: {detail}");
                StatusCode::SERVICE_UNAVAILABLE
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
