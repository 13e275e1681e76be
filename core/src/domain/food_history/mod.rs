pub mod controller;
pub mod entities;
pub mod policies;
pub mod ports;
pub mod state;
pub mod value_objects;

pub use controller::HistoryController;
pub use entities::*;
pub use ports::*;
pub use state::HistorySnapshot;
pub use value_objects::*;
