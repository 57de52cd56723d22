use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid American odds: {0} (odds of 0 have no payout)")]
    InvalidOdds(i64),

    #[error("Not enough analyzed fights for parlay: required {required}, available {available}")]
    InsufficientFights { required: usize, available: usize },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match &self {
            AppError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid request", "details": details }),
            ),
            AppError::InvalidOdds(_) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid odds", "details": self.to_string() }),
            ),
            AppError::InsufficientFights { required, available } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Not enough analyzed fights for parlay",
                    "required": required,
                    "available": available,
                }),
            ),
            AppError::Database(_) | AppError::Migration(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Storage failure", "details": self.to_string() }),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error", "details": self.to_string() }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn client_errors_are_json_400s() {
        let (status, body) = render(AppError::Validation("fighter1.name is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request");

        let (status, body) = render(AppError::InsufficientFights { required: 3, available: 1 }).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["available"], 1);
    }

    #[tokio::test]
    async fn storage_errors_are_500s() {
        let (status, body) = render(AppError::Database(sqlx::Error::RowNotFound)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Storage failure");

        let (status, body) = render(AppError::Config("bad PORT".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }
}
