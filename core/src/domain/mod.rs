pub mod authentication;
pub mod common;
pub mod food_history;
pub mod refresh;
pub mod user_profile;
