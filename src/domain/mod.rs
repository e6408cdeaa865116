pub mod money;
pub mod order_status;
pub mod pricing;
pub mod validate;

pub use order_status::{Actor, OrderAction, OrderStatus};
pub use pricing::{OrderTotals, PriceDisplay, PricedLine, PromoRules};
