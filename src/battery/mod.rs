// Battery module - deterministic energy simulation

mod model;

pub use model::*;
