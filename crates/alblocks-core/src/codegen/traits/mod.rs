pub mod emit;

pub use emit::{Emission, EmissionRule};
