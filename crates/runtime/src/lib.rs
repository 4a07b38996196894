pub mod event_bus;
pub mod frame;
pub mod scheduler;

pub use event_bus::*;
pub use frame::*;
pub use scheduler::*;
