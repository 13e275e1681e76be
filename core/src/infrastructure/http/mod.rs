pub mod client;
pub mod scalar;

pub use client::{ApiClient, Auth, map_transport_error};
pub use scalar::Scalar;
