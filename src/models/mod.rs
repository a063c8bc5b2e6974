pub mod common;
pub mod order;
pub mod pagination;
pub mod product_promotion;
pub mod promotion;
pub mod voucher;

pub use common::*;
pub use order::*;
pub use pagination::*;
pub use product_promotion::*;
pub use promotion::*;
pub use voucher::*;
