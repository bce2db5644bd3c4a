// Core data models for VANT
// These structs represent the pipeline entities

pub mod lead;
pub mod stage;

pub use lead::*;
pub use stage::*;
