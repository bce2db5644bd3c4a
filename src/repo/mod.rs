pub mod stage;
pub mod lead;
pub mod moves;

pub use stage::*;
pub use lead::*;
pub use moves::*;
