pub mod food_history_repository;
