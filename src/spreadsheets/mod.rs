pub mod orders_xlsx;

pub use orders_xlsx::export_orders_xlsx;
