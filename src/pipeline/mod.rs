//! The knowledge processing pipeline: orchestration, its log, and its failure
//! taxonomy.

pub mod error;
pub mod log;
pub mod processor;

pub use error::{FailureReport, ProcessError};
pub use log::{LogEntry, LogLevel, ProcessingLog};
pub use processor::{KnowledgeProcessor, PipelineState, ProcessingResult};
