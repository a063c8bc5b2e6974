use super::current_user;
use crate::models::*;
use crate::services::VoucherService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/vouchers",
    tag = "voucher",
    params(
        ("page" = Option<u64>, Query, description = "Halaman"),
        ("per_page" = Option<u64>, Query, description = "Jumlah per halaman"),
        ("status" = Option<String>, Query, description = "available/used/expired")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Daftar voucher milik pengguna"),
        (status = 401, description = "Belum login", body = ApiError)
    )
)]
pub async fn get_vouchers(
    voucher_service: web::Data<VoucherService>,
    req: HttpRequest,
    query: web::Query<VoucherQuery>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match voucher_service.list_user_vouchers(user.id, &query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "message": "Berhasil mengambil data voucher",
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/vouchers/claim",
    tag = "voucher",
    request_body = ClaimVoucherRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Voucher berhasil diklaim", body = VoucherResponse),
        (status = 400, description = "Voucher tidak dapat diklaim", body = ApiError),
        (status = 404, description = "Promosi tidak ditemukan", body = ApiError),
        (status = 410, description = "Promosi sudah berakhir", body = ApiError)
    )
)]
pub async fn claim_voucher(
    voucher_service: web::Data<VoucherService>,
    req: HttpRequest,
    request: web::Json<ClaimVoucherRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match voucher_service
        .claim_voucher(user.id, request.promotion_id)
        .await
    {
        Ok(response) => Ok(HttpResponse::Created().json(json!({
            "message": "Voucher berhasil diklaim",
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn voucher_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/vouchers")
            .route("", web::get().to(get_vouchers))
            .route("/claim", web::post().to(claim_voucher)),
    );
}
