pub mod cart;
pub mod connection;
pub mod magic_links;
pub mod orders;
pub mod products;
pub mod promos;
pub mod reviews;
pub mod stores;
pub mod users;

pub use connection::{init_db, Database};
