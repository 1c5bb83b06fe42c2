use crate::store::StoreError;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

/// Failures the engine surfaces to its callers, unmodified. The HTTP
/// layer maps them straight to responses via `ResponseError`.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Reference(String),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("document store unavailable")]
    Store(#[source] StoreError),
}

impl From<StoreError> for WorkflowError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { ref collection, ref id } => {
                WorkflowError::NotFound(format!("no document {id} in {collection}"))
            }
            StoreError::Conflict { .. } => WorkflowError::Conflict(e.to_string()),
            other => WorkflowError::Store(other),
        }
    }
}

impl ResponseError for WorkflowError {
    fn status_code(&self) -> StatusCode {
        match self {
            WorkflowError::Validation(_)
            | WorkflowError::Reference(_)
            | WorkflowError::InvalidTransition(_) => StatusCode::BAD_REQUEST,
            WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
            WorkflowError::Conflict(_) => StatusCode::CONFLICT,
            WorkflowError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let WorkflowError::Store(e) = self {
            tracing::error!(error = %e, "document store failure");
        }

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "message": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Collection;

    #[test]
    fn store_not_found_maps_to_not_found() {
        let err = WorkflowError::from(StoreError::NotFound {
            collection: Collection::OdRequests,
            id: "abc".into(),
        });
        assert!(matches!(err, WorkflowError::NotFound(_)));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn store_conflict_maps_to_conflict() {
        let err = WorkflowError::from(StoreError::Conflict {
            collection: Collection::OdRequests,
            id: "abc".into(),
            expected: 1,
            found: 2,
        });
        assert!(matches!(err, WorkflowError::Conflict(_)));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn unavailable_is_an_internal_error() {
        let err = WorkflowError::from(StoreError::Unavailable("connection refused".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
