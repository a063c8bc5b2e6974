use super::current_user;
use crate::models::*;
use crate::services::OrderService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/orders",
    tag = "order",
    params(
        ("page" = Option<u64>, Query, description = "Halaman"),
        ("per_page" = Option<u64>, Query, description = "Jumlah per halaman"),
        ("status" = Option<String>, Query, description = "Status pesanan")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Daftar pesanan"),
        (status = 401, description = "Belum login", body = ApiError)
    )
)]
pub async fn get_orders(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    query: web::Query<OrderQuery>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match order_service.list_user_orders(user.id, &query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "message": "Berhasil mengambil data pesanan",
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/orders/{id}/cancel",
    tag = "order",
    params(("id" = i64, Path, description = "ID pesanan")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Pesanan dibatalkan", body = OrderResponse),
        (status = 400, description = "Status pesanan tidak dapat dibatalkan", body = ApiError),
        (status = 404, description = "Pesanan tidak ditemukan", body = ApiError)
    )
)]
pub async fn cancel_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match order_service.cancel_order(user, path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "message": "Pesanan berhasil dibatalkan",
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/orders/{id}/confirm",
    tag = "order",
    params(("id" = i64, Path, description = "ID pesanan")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Pesanan dikonfirmasi", body = OrderResponse),
        (status = 400, description = "Pesanan belum dikirim", body = ApiError),
        (status = 403, description = "Bukan pemilik pesanan", body = ApiError),
        (status = 404, description = "Pesanan tidak ditemukan", body = ApiError)
    )
)]
pub async fn confirm_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match order_service.confirm_shipment(user, path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "message": "Pesanan berhasil dikonfirmasi",
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::get().to(get_orders))
            .route("/{id}/cancel", web::post().to(cancel_order))
            .route("/{id}/confirm", web::post().to(confirm_order)),
    );
}
