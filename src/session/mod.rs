//! Session lifecycle and detection orchestration
//!
//! A session is one observer's registration with the backend. This
//! module holds the per-session state, the coordinator that runs the
//! classify → stabilize → gate → dispatch pipeline over that state, and
//! the fixed-period driver that feeds the coordinator from an
//! observation source.

pub mod coordinator;
pub mod driver;
pub mod state;

pub use coordinator::{FrameOutcome, SessionCoordinator};
pub use driver::{run_detection, DetectionReport};
pub use state::{SessionId, SessionState};
