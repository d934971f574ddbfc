use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::models::GroupStatus;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Group not joinable: {0}")]
    GroupNotJoinable(String),

    #[error("Illegal status transition: {from} -> {to}")]
    InvalidStateTransition { from: GroupStatus, to: GroupStatus },

    #[error("Participant not found: {0}")]
    ParticipantNotFound(String),

    #[error("Tier configuration error: {0}")]
    TierConfiguration(String),

    #[error("Payment gateway unavailable: {0}")]
    PaymentGatewayUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::InvalidQuantity(msg) => {
                log::warn!("Invalid quantity: {msg}");
                (StatusCode::BAD_REQUEST, "INVALID_QUANTITY", msg.clone())
            }
            AppError::GroupNotJoinable(msg) => {
                log::warn!("Group not joinable: {msg}");
                (StatusCode::CONFLICT, "GROUP_NOT_JOINABLE", msg.clone())
            }
            AppError::InvalidStateTransition { from, to } => {
                log::warn!("Illegal status transition: {from} -> {to}");
                (
                    StatusCode::BAD_REQUEST,
                    "INVALID_STATE_TRANSITION",
                    format!("Illegal status transition: {from} -> {to}"),
                )
            }
            AppError::ParticipantNotFound(msg) => (
                StatusCode::NOT_FOUND,
                "PARTICIPANT_NOT_FOUND",
                msg.clone(),
            ),
            AppError::TierConfiguration(msg) => {
                log::warn!("Tier configuration rejected: {msg}");
                (
                    StatusCode::BAD_REQUEST,
                    "TIER_CONFIGURATION_ERROR",
                    msg.clone(),
                )
            }
            AppError::PaymentGatewayUnavailable(msg) => {
                log::error!("Payment gateway unavailable: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "PAYMENT_GATEWAY_UNAVAILABLE",
                    msg.clone(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::ExternalApiError(msg) => {
                log::error!("External API error: {msg}");
                (StatusCode::BAD_GATEWAY, "EXTERNAL_API_ERROR", msg.clone())
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            AppError::MigrateError(err) => {
                log::error!("Migration error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MIGRATION_ERROR",
                    "Migration error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}
