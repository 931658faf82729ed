//! Screening intake, submission, and verdict presentation.

pub mod controller;
pub mod intake;
pub mod results;
pub mod scoring;
pub mod sessions;

pub use controller::{
    ControllerError, CorrelationToken, PendingSubmission, ScreeningResult, SubmissionController,
    SubmissionOutcome, ViewState,
};
pub use scoring::{
    ClientBuildError, HttpScoringClient, ScoringClient, SubmissionError, TransportError,
    SUBMISSION_FAILED_NOTICE,
};
