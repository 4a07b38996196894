pub mod chat_output;
pub mod extract;
pub mod lenient;
pub mod trip_summary;

pub use chat_output::*;
pub use extract::*;
pub use trip_summary::*;
