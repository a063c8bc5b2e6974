pub mod admin_access;
pub mod checkout_service;
pub mod order_service;
pub mod product_promotion_service;
pub mod promotion_service;
pub mod voucher_service;

pub use admin_access::check_admin_access;
pub use checkout_service::CheckoutService;
pub use order_service::OrderService;
pub use product_promotion_service::ProductPromotionService;
pub use promotion_service::PromotionService;
pub use voucher_service::VoucherService;
