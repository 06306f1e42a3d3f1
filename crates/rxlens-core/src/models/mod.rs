//! Domain models for the RxLens catalog.

mod candidate;
mod medicine;
mod rows;

pub use candidate::*;
pub use medicine::*;
pub use rows::*;
