pub mod chat_history;
pub mod error;
pub mod form;
pub mod generation;
pub mod session;

pub use chat_history::*;
pub use error::*;
pub use form::*;
pub use generation::*;
pub use session::*;
