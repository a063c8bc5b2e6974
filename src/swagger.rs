use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{
    DiscountType, OrderStatus, PromotionScope, PromotionSource, PromotionState, PromotionType,
};
use crate::handlers;
use crate::models::*;
use crate::tasks::{SweepFailure, SweepReport};
use crate::utils::CheckoutBreakdown;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::promotion::list_promotions,
        handlers::promotion::create_promotion,
        handlers::promotion::get_promotion,
        handlers::promotion::update_promotion,
        handlers::promotion::update_promotion_state,
        handlers::product_promotion::list_free_product_promotions,
        handlers::product_promotion::create_free_product_promotion,
        handlers::product_promotion::get_free_product_promotion,
        handlers::product_promotion::update_free_product_promotion,
        handlers::product_promotion::update_free_product_promotion_state,
        handlers::product_promotion::list_discount_product_promotions,
        handlers::product_promotion::create_discount_product_promotion,
        handlers::product_promotion::get_discount_product_promotion,
        handlers::product_promotion::update_discount_product_promotion,
        handlers::product_promotion::update_discount_product_promotion_state,
        handlers::voucher::get_vouchers,
        handlers::voucher::claim_voucher,
        handlers::checkout::quote,
        handlers::order::get_orders,
        handlers::order::cancel_order,
        handlers::order::confirm_order,
        handlers::sweep::sweep_pending_payments,
        handlers::sweep::sweep_shipped_orders,
    ),
    components(
        schemas(
            PromotionScope,
            PromotionSource,
            PromotionState,
            PromotionType,
            DiscountType,
            OrderStatus,
            CreatePromotionRequest,
            UpdatePromotionRequest,
            UpdatePromotionStateRequest,
            PromotionQuery,
            PromotionResponse,
            CreateFreeProductPromotionRequest,
            UpdateFreeProductPromotionRequest,
            CreateDiscountProductPromotionRequest,
            UpdateDiscountProductPromotionRequest,
            ProductPromotionQuery,
            FreeProductPromotionResponse,
            DiscountProductPromotionResponse,
            VoucherStatus,
            ClaimVoucherRequest,
            VoucherQuery,
            VoucherResponse,
            CheckoutQuoteRequest,
            CheckoutQuoteResponse,
            CheckoutBreakdown,
            OrderQuery,
            OrderResponse,
            SweepReport,
            SweepFailure,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "promotion", description = "Promosi umum dan promosi toko"),
        (name = "product_promotion", description = "Promosi gratis produk dan diskon produk"),
        (name = "voucher", description = "Voucher pengguna"),
        (name = "checkout", description = "Perhitungan harga checkout"),
        (name = "order", description = "Pesanan pengguna"),
        (name = "admin", description = "Tugas pemeliharaan pesanan"),
    ),
    info(
        title = "Tokoku Backend API",
        version = "1.0.0",
        description = "Tokoku promotion, voucher and order REST API"
    ),
    servers(
        (url = "/api", description = "Local server")
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/admin/promotions/{id}/state"));
        assert!(paths.contains_key("/checkout/quote"));
        assert!(paths.contains_key("/admin/sweeps/shipped-orders"));
    }
}
