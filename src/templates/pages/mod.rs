pub mod admin;
pub mod admin_catalog;
pub mod admin_moderation;
pub mod admin_orders;
pub mod admin_promos;
pub mod cart;
pub mod catalog;
pub mod check_email;
pub mod home;
pub mod login;
pub mod orders;

pub use admin::{admin_dashboard_page, DashboardVm};
pub use admin_catalog::{admin_products_page, product_form_page};
pub use admin_moderation::{admin_reviews_page, admin_users_page};
pub use admin_orders::{admin_order_page, admin_orders_page};
pub use admin_promos::{admin_promo_page, admin_promos_page};
pub use cart::{cart_page, CartVm};
pub use catalog::{catalog_page, product_page, CatalogVm, ProductVm};
pub use check_email::check_email_content;
pub use home::stores_page;
pub use login::login_page;
pub use orders::{order_page, orders_page, OrderVm};
