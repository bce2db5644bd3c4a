// Lead pipeline: view model, reducer, backend seam and move orchestration

pub mod backend;
pub mod error;
pub mod idempotency;
pub mod orchestrator;
pub mod state;

pub use backend::*;
pub use error::PipelineError;
pub use idempotency::*;
pub use orchestrator::*;
pub use state::*;
