pub mod authentication;
pub mod food_history;
pub mod http;
pub mod token_store;
pub mod user_profile;
