pub mod checkout;
pub mod order_workflow;
pub mod reviews;
