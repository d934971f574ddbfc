use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::group_order::list_group_orders,
        handlers::group_order::create_group_order,
        handlers::group_order::get_group_order,
        handlers::group_order::update_group_status,
        handlers::group_order::delete_group_order,
        handlers::participant::join_group,
        handlers::participant::update_payment,
        handlers::participant::generate_payment_link,
    ),
    components(
        schemas(
            GroupStatus,
            GroupOrder,
            GroupOrderSummary,
            GroupOrderDetail,
            ProductSnapshot,
            CreateGroupOrderRequest,
            UpdateGroupStatusRequest,
            GroupOrderQuery,
            PriceTier,
            PriceTierInput,
            PriceTierResponse,
            PaymentStatus,
            Participant,
            ParticipantResponse,
            JoinGroupRequest,
            JoinGroupResponse,
            UpdatePaymentRequest,
            GeneratePaymentLinkRequest,
            PaymentSummary,
            PaymentLink,
            PaymentLinkResponse,
            PaginationParams,
            ApiError,
        )
    ),
    tags(
        (name = "group-order", description = "Group purchase campaign API"),
        (name = "participant", description = "Participant ledger API"),
        (name = "payment", description = "Payment tracking and link API"),
    ),
    info(
        title = "Group Purchase Backend API",
        version = "1.0.0",
        description = "Collective purchasing REST API documentation",
        contact(
            name = "API Support",
            email = "support@groupbuy.example.sn"
        )
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
