// Strategy module - adaptive send strategy selection

mod selector;

pub use selector::*;
