// Packet module - wire framing and payload codecs

mod header;
mod payload;

pub use header::*;
pub use payload::*;
