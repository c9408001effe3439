// Receiver module - deduplicating, acknowledging receive side

mod listener;
mod session;

pub use listener::*;
pub use session::*;
