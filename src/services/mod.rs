//! Services separating local I/O and reporting from request logic

pub mod io;
pub mod progress;

pub use io::{infer_media_type, LocalFiles, UploadFile};
pub use progress::{
    JsonLinesReporter, NoOpStepReporter, StepReport, StepReporter, StepTracker, WorkflowStep,
};
