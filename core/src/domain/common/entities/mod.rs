pub mod api_error_body;
pub mod app_errors;
