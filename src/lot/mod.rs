pub mod model;
pub mod validation;

pub use model::{Lot, LotPatch, NewLot, Patch};
