// ============================================================================
// Mode Controller
// ============================================================================
//
// - mode.rs    - Mode / ModeConfig and their precedence
// - answer.rs  - Answer<T> and its DataSource
// - service.rs - DataController: remote attempt, fallback, local execution
// - errors.rs  - ControllerError
//
// ============================================================================

mod answer;
mod errors;
mod mode;
mod service;

pub use answer::{Answer, DataSource};
pub use errors::ControllerError;
pub use mode::{Mode, ModeConfig};
pub use service::DataController;
