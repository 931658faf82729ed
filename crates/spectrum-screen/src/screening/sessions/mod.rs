//! Server-side intake sessions: one submission controller per browser session.

pub mod router;
pub mod service;
mod views;

#[cfg(test)]
mod tests;

pub use router::intake_router;
pub use service::{IntakeSessionService, SessionId, SessionServiceError, SubmitReport};
pub use views::{FieldUpdate, SessionView};
