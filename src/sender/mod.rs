// Sender module - reliable energy-aware sender

mod report;
mod session;

pub use report::*;
pub use session::*;
