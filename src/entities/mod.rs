pub mod discount_product_promotions;
pub mod free_product_promotions;
pub mod inventories;
pub mod order_status_logs;
pub mod orders;
pub mod promotions;
pub mod store_admins;
pub mod users;
pub mod vouchers;

pub use discount_product_promotions as discount_product_promotion_entity;
pub use free_product_promotions as free_product_promotion_entity;
pub use inventories as inventory_entity;
pub use order_status_logs as order_status_log_entity;
pub use orders as order_entity;
pub use promotions as promotion_entity;
pub use store_admins as store_admin_entity;
pub use users as user_entity;
pub use vouchers as voucher_entity;

pub use orders::OrderStatus;
pub use promotions::{DiscountType, PromotionScope, PromotionSource, PromotionState, PromotionType};
pub use users::UserRole;
