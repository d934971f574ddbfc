use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::models::*;
use crate::services::{ParticipantService, PaymentLinkService};

#[utoipa::path(
    post,
    path = "/group-orders/{id}/join",
    tag = "participant",
    params(
        ("id" = i64, Path, description = "Group order id")
    ),
    request_body = JoinGroupRequest,
    responses(
        (status = 200, description = "Joined, response carries the refreshed aggregate"),
        (status = 400, description = "Invalid quantity or phone"),
        (status = 409, description = "Campaign not open or deadline passed")
    )
)]
pub async fn join_group(
    service: web::Data<ParticipantService>,
    path: web::Path<i64>,
    request: web::Json<JoinGroupRequest>,
) -> Result<HttpResponse> {
    match service.join(path.into_inner(), request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/group-orders/{id}/payment",
    tag = "payment",
    params(
        ("id" = i64, Path, description = "Group order id")
    ),
    request_body = UpdatePaymentRequest,
    responses(
        (status = 200, description = "Payment tracking updated"),
        (status = 404, description = "Unknown group order or participant phone")
    )
)]
pub async fn update_payment(
    service: web::Data<ParticipantService>,
    path: web::Path<i64>,
    request: web::Json<UpdatePaymentRequest>,
) -> Result<HttpResponse> {
    match service
        .record_payment(path.into_inner(), request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "message": "Payment updated"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/group-orders/{id}/payment-link",
    tag = "payment",
    params(
        ("id" = i64, Path, description = "Group order id")
    ),
    request_body = GeneratePaymentLinkRequest,
    responses(
        (status = 200, description = "Payment links for the outstanding balance; empty with a warning when the gateway is down"),
        (status = 400, description = "Nothing outstanding"),
        (status = 404, description = "Unknown group order or participant phone")
    )
)]
pub async fn generate_payment_link(
    service: web::Data<PaymentLinkService>,
    path: web::Path<i64>,
    request: web::Json<GeneratePaymentLinkRequest>,
) -> Result<HttpResponse> {
    match service.generate(path.into_inner(), request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn participant_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/group-orders/{id}/join", web::post().to(join_group))
        .route("/group-orders/{id}/payment", web::patch().to(update_payment))
        .route(
            "/group-orders/{id}/payment-link",
            web::post().to(generate_payment_link),
        );
}
