use super::require_super_admin;
use crate::config::SweeperConfig;
use crate::models::*;
use crate::services::OrderService;
use crate::tasks::OrderSweeper;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

// 手动触发的清理以调用者身份记录状态变更
fn sweeper_for(
    order_service: &OrderService,
    config: &SweeperConfig,
    actor: AuthUser,
) -> OrderSweeper {
    OrderSweeper::new(order_service.clone(), actor, config.clone())
}

#[utoipa::path(
    post,
    path = "/admin/sweeps/pending-payments",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Pesanan kedaluwarsa dibatalkan", body = SweepReport),
        (status = 401, description = "Hanya super admin", body = ApiError)
    )
)]
pub async fn sweep_pending_payments(
    order_service: web::Data<OrderService>,
    config: web::Data<SweeperConfig>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let actor = require_super_admin(&req)?;

    match sweeper_for(&order_service, &config, actor)
        .cancel_expired_pending_payments()
        .await
    {
        Ok(report) => Ok(HttpResponse::Ok().json(json!({
            "message": "Pembatalan pesanan kedaluwarsa selesai",
            "data": report
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/sweeps/shipped-orders",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Pesanan terkirim dikonfirmasi otomatis", body = SweepReport),
        (status = 401, description = "Hanya super admin", body = ApiError)
    )
)]
pub async fn sweep_shipped_orders(
    order_service: web::Data<OrderService>,
    config: web::Data<SweeperConfig>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let actor = require_super_admin(&req)?;

    match sweeper_for(&order_service, &config, actor)
        .confirm_stale_shipments()
        .await
    {
        Ok(report) => Ok(HttpResponse::Ok().json(json!({
            "message": "Konfirmasi pesanan terkirim selesai",
            "data": report
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn sweep_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin/sweeps")
            .route("/pending-payments", web::post().to(sweep_pending_payments))
            .route("/shipped-orders", web::post().to(sweep_shipped_orders)),
    );
}
