use super::require_admin;
use crate::models::*;
use crate::services::PromotionService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/admin/promotions",
    tag = "promotion",
    params(
        ("page" = Option<u64>, Query, description = "Halaman"),
        ("per_page" = Option<u64>, Query, description = "Jumlah per halaman"),
        ("state" = Option<String>, Query, description = "draft/published/archived"),
        ("scope" = Option<String>, Query, description = "general/store"),
        ("source" = Option<String>, Query, description = "Sumber promosi"),
        ("store_id" = Option<i64>, Query, description = "ID toko")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Daftar promosi"),
        (status = 401, description = "Tidak memiliki akses", body = ApiError)
    )
)]
pub async fn list_promotions(
    promotion_service: web::Data<PromotionService>,
    req: HttpRequest,
    query: web::Query<PromotionQuery>,
) -> Result<HttpResponse> {
    require_admin(&req)?;

    match promotion_service.list_promotions(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "message": "Berhasil mengambil data promosi",
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/promotions",
    tag = "promotion",
    request_body = CreatePromotionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Promosi dibuat", body = PromotionResponse),
        (status = 400, description = "Data tidak valid", body = ApiError),
        (status = 401, description = "Tidak memiliki akses", body = ApiError)
    )
)]
pub async fn create_promotion(
    promotion_service: web::Data<PromotionService>,
    req: HttpRequest,
    request: web::Json<CreatePromotionRequest>,
) -> Result<HttpResponse> {
    let actor = require_admin(&req)?;

    match promotion_service
        .create_promotion(actor, request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Created().json(json!({
            "message": "Promosi berhasil dibuat",
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/promotions/{id}",
    tag = "promotion",
    params(("id" = i64, Path, description = "ID promosi")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Detail promosi", body = PromotionResponse),
        (status = 404, description = "Promosi tidak ditemukan", body = ApiError)
    )
)]
pub async fn get_promotion(
    promotion_service: web::Data<PromotionService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    require_admin(&req)?;

    match promotion_service.get_promotion(path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "message": "Berhasil mengambil data promosi",
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/promotions/{id}",
    tag = "promotion",
    params(("id" = i64, Path, description = "ID promosi")),
    request_body = UpdatePromotionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Promosi diperbarui", body = PromotionResponse),
        (status = 400, description = "Data tidak valid", body = ApiError),
        (status = 404, description = "Promosi tidak ditemukan", body = ApiError)
    )
)]
pub async fn update_promotion(
    promotion_service: web::Data<PromotionService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdatePromotionRequest>,
) -> Result<HttpResponse> {
    let actor = require_admin(&req)?;

    match promotion_service
        .update_promotion(actor, path.into_inner(), request.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "message": "Promosi berhasil diperbarui",
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/admin/promotions/{id}/state",
    tag = "promotion",
    params(("id" = i64, Path, description = "ID promosi")),
    request_body = UpdatePromotionStateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Status promosi diperbarui", body = PromotionResponse),
        (status = 400, description = "Perpindahan status tidak diizinkan", body = ApiError),
        (status = 404, description = "Promosi tidak ditemukan", body = ApiError)
    )
)]
pub async fn update_promotion_state(
    promotion_service: web::Data<PromotionService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdatePromotionStateRequest>,
) -> Result<HttpResponse> {
    let actor = require_admin(&req)?;

    match promotion_service
        .update_promotion_state(actor, path.into_inner(), request.state)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "message": "Status promosi berhasil diperbarui",
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn promotion_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin/promotions")
            .route("", web::get().to(list_promotions))
            .route("", web::post().to(create_promotion))
            .route("/{id}", web::get().to(get_promotion))
            .route("/{id}", web::put().to(update_promotion))
            .route("/{id}/state", web::patch().to(update_promotion_state)),
    );
}
