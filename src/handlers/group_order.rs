use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::models::*;
use crate::services::GroupOrderService;

#[utoipa::path(
    get,
    path = "/group-orders",
    tag = "group-order",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page"),
        ("status" = Option<String>, Query, description = "Filter by campaign status")
    ),
    responses(
        (status = 200, description = "Paginated group order list")
    )
)]
pub async fn list_group_orders(
    service: web::Data<GroupOrderService>,
    query: web::Query<GroupOrderQuery>,
) -> Result<HttpResponse> {
    match service.list_group_orders(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/group-orders",
    tag = "group-order",
    request_body = CreateGroupOrderRequest,
    responses(
        (status = 200, description = "Group order created"),
        (status = 400, description = "Invalid tier table or bounds")
    )
)]
pub async fn create_group_order(
    service: web::Data<GroupOrderService>,
    request: web::Json<CreateGroupOrderRequest>,
) -> Result<HttpResponse> {
    match service.create_group_order(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "message": "Group order created"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/group-orders/{id}",
    tag = "group-order",
    params(
        ("id" = i64, Path, description = "Group order id")
    ),
    responses(
        (status = 200, description = "Group order detail with tiers and participants"),
        (status = 404, description = "Unknown group order")
    )
)]
pub async fn get_group_order(
    service: web::Data<GroupOrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.get_group_order(path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/group-orders/{id}/status",
    tag = "group-order",
    params(
        ("id" = i64, Path, description = "Group order id")
    ),
    request_body = UpdateGroupStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Transition not allowed by the lifecycle"),
        (status = 404, description = "Unknown group order")
    )
)]
pub async fn update_group_status(
    service: web::Data<GroupOrderService>,
    path: web::Path<i64>,
    request: web::Json<UpdateGroupStatusRequest>,
) -> Result<HttpResponse> {
    match service
        .update_status(path.into_inner(), request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "message": "Status updated"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/group-orders/{id}",
    tag = "group-order",
    params(
        ("id" = i64, Path, description = "Group order id")
    ),
    responses(
        (status = 200, description = "Group order and its participants deleted"),
        (status = 404, description = "Unknown group order")
    )
)]
pub async fn delete_group_order(
    service: web::Data<GroupOrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.delete_group_order(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Group order deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn group_order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/group-orders")
            .route("", web::get().to(list_group_orders))
            .route("", web::post().to(create_group_order))
            .route("/{id}", web::get().to(get_group_order))
            .route("/{id}", web::delete().to(delete_group_order))
            .route("/{id}/status", web::patch().to(update_group_status)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_service() -> GroupOrderService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        GroupOrderService::new(pool)
    }

    #[actix_web::test]
    async fn create_then_fetch_roundtrip() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_service().await))
                .configure(group_order_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/group-orders")
            .set_json(json!({
                "product_ref": "FW-100",
                "product_name": "UTM firewall appliance",
                "base_price": 1200,
                "min_qty": 5,
                "target_qty": 100,
                "price_tiers": [
                    {"min_qty": 1, "max_qty": 9, "unit_price": 1000},
                    {"min_qty": 10, "unit_price": 900}
                ]
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], json!(true));
        let id = body["data"]["id"].as_i64().unwrap();

        let req = test::TestRequest::get()
            .uri(&format!("/group-orders/{}", id))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["status"], json!("draft"));
        assert_eq!(body["data"]["current_unit_price"], json!(1200));
        assert_eq!(body["data"]["price_tiers"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn illegal_transition_returns_400_with_code() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_service().await))
                .configure(group_order_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/group-orders")
            .set_json(json!({
                "product_ref": "FW-100",
                "product_name": "UTM firewall appliance",
                "base_price": 1200,
                "min_qty": 5,
                "target_qty": 100
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let id = body["data"]["id"].as_i64().unwrap();

        // draft cannot jump to shipped
        let req = test::TestRequest::patch()
            .uri(&format!("/group-orders/{}/status", id))
            .set_json(json!({"status": "shipped"}))
            .to_request();
        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), 400);

        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"]["code"], json!("INVALID_STATE_TRANSITION"));
    }
}
