pub mod date;
pub mod week;

pub use date::*;
pub use week::*;
