mod admin_tests;
mod api_tests;
mod auth_flow_tests;
mod catalog_tests;
mod checkout_tests;
mod order_workflow_tests;
mod review_tests;
