//! Status mapping for boundary errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::error::OrchestratorError;

impl OrchestratorError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for OrchestratorError {
    fn into_response(self) -> Response {
        let detail = match &self {
            Self::InvalidInput(msg) => msg.clone(),
            Self::NotFound(_) => "Task not found.".to_string(),
        };
        (self.status_code(), Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            OrchestratorError::InvalidInput("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            OrchestratorError::NotFound("abc".into())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
    }
}
