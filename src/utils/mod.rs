pub mod code_generator;
pub mod discount;
pub mod jwt;
pub mod promotion_rules;

pub use code_generator::generate_voucher_code;
pub use discount::*;
pub use jwt::*;
