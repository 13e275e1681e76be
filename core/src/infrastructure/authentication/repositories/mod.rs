pub mod auth_repository;
