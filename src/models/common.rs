use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error payload shape every endpoint uses on failure, mirrored by the
/// `ResponseError` impl on `AppError`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}
