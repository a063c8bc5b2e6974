use super::current_user;
use crate::models::*;
use crate::services::CheckoutService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/checkout/quote",
    tag = "checkout",
    request_body = CheckoutQuoteRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Rincian harga setelah voucher", body = CheckoutQuoteResponse),
        (status = 400, description = "Voucher tidak dapat digunakan", body = ApiError),
        (status = 404, description = "Voucher tidak ditemukan", body = ApiError),
        (status = 410, description = "Voucher sudah kedaluwarsa", body = ApiError)
    )
)]
pub async fn quote(
    checkout_service: web::Data<CheckoutService>,
    req: HttpRequest,
    request: web::Json<CheckoutQuoteRequest>,
) -> Result<HttpResponse> {
    let user = current_user(&req)?;

    match checkout_service.quote(user.id, &request).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "message": "Berhasil menghitung total pembayaran",
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn checkout_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/checkout").route("/quote", web::post().to(quote)));
}
