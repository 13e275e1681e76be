pub mod entities;
pub mod ports;
pub mod services;
pub mod validators;
pub mod value_objects;
