use actix_web::{
    http::{header, StatusCode},
    HttpResponse,
};
use dosewatch_domain::LifecycleError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DosewatchError {
    #[error("The reminder store is unavailable, please try again later")]
    StoreUnavailable,
    #[error("Invalid data provided: Error message: `{0}`")]
    BadClientData(String),
    #[error("The reminder can not be changed: {0}")]
    InvalidTransition(#[from] LifecycleError),
    #[error("Unauthorized request. Error message: `{0}`")]
    Unauthorized(String),
    #[error("404 Not found. Error message: `{0}`")]
    NotFound(String),
}

impl actix_web::error::ResponseError for DosewatchError {
    fn status_code(&self) -> StatusCode {
        match *self {
            Self::StoreUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadClientData(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidTransition(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header((header::CONTENT_TYPE, "text/html; charset=utf-8"))
            .body(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;
    use dosewatch_domain::ReminderStatus;

    #[test]
    fn lifecycle_errors_are_conflicts() {
        let err: DosewatchError = LifecycleError::InvalidTransition {
            from: ReminderStatus::Dismissed,
            to: ReminderStatus::Sent,
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            err.to_string(),
            "The reminder can not be changed: A reminder can not go from `dismissed` to `sent`"
        );
        assert_eq!(
            DosewatchError::StoreUnavailable.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
