use super::require_admin;
use crate::models::*;
use crate::services::ProductPromotionService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

// ---- buy X get Y ----

#[utoipa::path(
    get,
    path = "/admin/free-product-promotions",
    tag = "product_promotion",
    params(
        ("page" = Option<u64>, Query, description = "Halaman"),
        ("per_page" = Option<u64>, Query, description = "Jumlah per halaman"),
        ("inventory_id" = Option<i64>, Query, description = "ID inventaris"),
        ("state" = Option<String>, Query, description = "draft/published/archived")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Daftar promosi gratis produk"),
        (status = 401, description = "Tidak memiliki akses", body = ApiError)
    )
)]
pub async fn list_free_product_promotions(
    service: web::Data<ProductPromotionService>,
    req: HttpRequest,
    query: web::Query<ProductPromotionQuery>,
) -> Result<HttpResponse> {
    require_admin(&req)?;

    match service.list_free_product_promotions(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "message": "Berhasil mengambil data promosi",
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/free-product-promotions",
    tag = "product_promotion",
    request_body = CreateFreeProductPromotionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Promosi dibuat", body = FreeProductPromotionResponse),
        (status = 400, description = "Data tidak valid atau periode bertabrakan", body = ApiError),
        (status = 401, description = "Tidak memiliki akses", body = ApiError)
    )
)]
pub async fn create_free_product_promotion(
    service: web::Data<ProductPromotionService>,
    req: HttpRequest,
    request: web::Json<CreateFreeProductPromotionRequest>,
) -> Result<HttpResponse> {
    let actor = require_admin(&req)?;

    match service
        .create_free_product_promotion(actor, request.into_inner())
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
    path = "/admin/free-product-promotions/{id}",
    tag = "product_promotion",
    params(("id" = i64, Path, description = "ID promosi")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Detail promosi", body = FreeProductPromotionResponse),
        (status = 404, description = "Promosi tidak ditemukan", body = ApiError)
    )
)]
pub async fn get_free_product_promotion(
    service: web::Data<ProductPromotionService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    require_admin(&req)?;

    match service.get_free_product_promotion(path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "message": "Berhasil mengambil data promosi",
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/free-product-promotions/{id}",
    tag = "product_promotion",
    params(("id" = i64, Path, description = "ID promosi")),
    request_body = UpdateFreeProductPromotionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Promosi diperbarui", body = FreeProductPromotionResponse),
        (status = 400, description = "Data tidak valid atau periode bertabrakan", body = ApiError),
        (status = 404, description = "Promosi tidak ditemukan", body = ApiError)
    )
)]
pub async fn update_free_product_promotion(
    service: web::Data<ProductPromotionService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateFreeProductPromotionRequest>,
) -> Result<HttpResponse> {
    let actor = require_admin(&req)?;

    match service
        .update_free_product_promotion(actor, path.into_inner(), request.into_inner())
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
    path = "/admin/free-product-promotions/{id}/state",
    tag = "product_promotion",
    params(("id" = i64, Path, description = "ID promosi")),
    request_body = UpdatePromotionStateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Status promosi diperbarui", body = FreeProductPromotionResponse),
        (status = 400, description = "Perpindahan status tidak diizinkan", body = ApiError),
        (status = 404, description = "Promosi tidak ditemukan", body = ApiError)
    )
)]
pub async fn update_free_product_promotion_state(
    service: web::Data<ProductPromotionService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdatePromotionStateRequest>,
) -> Result<HttpResponse> {
    let actor = require_admin(&req)?;

    match service
        .update_free_product_promotion_state(actor, path.into_inner(), request.state)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "message": "Status promosi berhasil diperbarui",
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

// ---- product discount ----

#[utoipa::path(
    get,
    path = "/admin/discount-product-promotions",
    tag = "product_promotion",
    params(
        ("page" = Option<u64>, Query, description = "Halaman"),
        ("per_page" = Option<u64>, Query, description = "Jumlah per halaman"),
        ("inventory_id" = Option<i64>, Query, description = "ID inventaris"),
        ("state" = Option<String>, Query, description = "draft/published/archived")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Daftar promosi diskon produk"),
        (status = 401, description = "Tidak memiliki akses", body = ApiError)
    )
)]
pub async fn list_discount_product_promotions(
    service: web::Data<ProductPromotionService>,
    req: HttpRequest,
    query: web::Query<ProductPromotionQuery>,
) -> Result<HttpResponse> {
    require_admin(&req)?;

    match service.list_discount_product_promotions(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "message": "Berhasil mengambil data promosi",
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/discount-product-promotions",
    tag = "product_promotion",
    request_body = CreateDiscountProductPromotionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Promosi dibuat", body = DiscountProductPromotionResponse),
        (status = 400, description = "Data tidak valid atau periode bertabrakan", body = ApiError),
        (status = 401, description = "Tidak memiliki akses", body = ApiError)
    )
)]
pub async fn create_discount_product_promotion(
    service: web::Data<ProductPromotionService>,
    req: HttpRequest,
    request: web::Json<CreateDiscountProductPromotionRequest>,
) -> Result<HttpResponse> {
    let actor = require_admin(&req)?;

    match service
        .create_discount_product_promotion(actor, request.into_inner())
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
    path = "/admin/discount-product-promotions/{id}",
    tag = "product_promotion",
    params(("id" = i64, Path, description = "ID promosi")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Detail promosi", body = DiscountProductPromotionResponse),
        (status = 404, description = "Promosi tidak ditemukan", body = ApiError)
    )
)]
pub async fn get_discount_product_promotion(
    service: web::Data<ProductPromotionService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    require_admin(&req)?;

    match service.get_discount_product_promotion(path.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "message": "Berhasil mengambil data promosi",
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/discount-product-promotions/{id}",
    tag = "product_promotion",
    params(("id" = i64, Path, description = "ID promosi")),
    request_body = UpdateDiscountProductPromotionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Promosi diperbarui", body = DiscountProductPromotionResponse),
        (status = 400, description = "Data tidak valid atau periode bertabrakan", body = ApiError),
        (status = 404, description = "Promosi tidak ditemukan", body = ApiError)
    )
)]
pub async fn update_discount_product_promotion(
    service: web::Data<ProductPromotionService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateDiscountProductPromotionRequest>,
) -> Result<HttpResponse> {
    let actor = require_admin(&req)?;

    match service
        .update_discount_product_promotion(actor, path.into_inner(), request.into_inner())
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
    path = "/admin/discount-product-promotions/{id}/state",
    tag = "product_promotion",
    params(("id" = i64, Path, description = "ID promosi")),
    request_body = UpdatePromotionStateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Status promosi diperbarui", body = DiscountProductPromotionResponse),
        (status = 400, description = "Perpindahan status tidak diizinkan", body = ApiError),
        (status = 404, description = "Promosi tidak ditemukan", body = ApiError)
    )
)]
pub async fn update_discount_product_promotion_state(
    service: web::Data<ProductPromotionService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdatePromotionStateRequest>,
) -> Result<HttpResponse> {
    let actor = require_admin(&req)?;

    match service
        .update_discount_product_promotion_state(actor, path.into_inner(), request.state)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "message": "Status promosi berhasil diperbarui",
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn product_promotion_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin/free-product-promotions")
            .route("", web::get().to(list_free_product_promotions))
            .route("", web::post().to(create_free_product_promotion))
            .route("/{id}", web::get().to(get_free_product_promotion))
            .route("/{id}", web::put().to(update_free_product_promotion))
            .route(
                "/{id}/state",
                web::patch().to(update_free_product_promotion_state),
            ),
    )
    .service(
        web::scope("/admin/discount-product-promotions")
            .route("", web::get().to(list_discount_product_promotions))
            .route("", web::post().to(create_discount_product_promotion))
            .route("/{id}", web::get().to(get_discount_product_promotion))
            .route("/{id}", web::put().to(update_discount_product_promotion))
            .route(
                "/{id}/state",
                web::patch().to(update_discount_product_promotion_state),
            ),
    );
}
