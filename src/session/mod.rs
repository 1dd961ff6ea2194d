//! Live session core: state, echo suppression, buffering, and the
//! coordinator loop.
//!
//! * [`SessionState`] / [`SharedState`] — single-writer mutable state of one
//!   session, snapshotted for polling.
//! * [`echo`] — self-echo suppression (is the speaker reading the card
//!   back?).
//! * [`UtteranceBuffer`] — fragment reassembly with timeout and noise decay.
//! * [`StreamCoordinator`] — the per-session control loop tying it all
//!   together.

pub mod buffer;
pub mod coordinator;
pub mod echo;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use buffer::UtteranceBuffer;
pub use coordinator::StreamCoordinator;
pub use echo::is_echo;
pub use state::{new_shared_state, SessionSnapshot, SessionState, SharedState};
