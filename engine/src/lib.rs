//! # Match Engine Library
//!
//! Deterministic simulation core for the two-paddle ball game, shared by the
//! offline and networked play modes. The engine owns everything with real
//! invariants: physics and scoring, the authority model deciding who computes
//! truth, client-side prediction and reconciliation, and the match lifecycle.
//!
//! ## Authority Model
//!
//! Exactly one role is active per session. `Single` and `Host` run the full
//! authoritative simulation locally; `Client` only extrapolates the ball
//! along its last known velocity and conforms to the snapshots the host
//! broadcasts every tick. Roles are a closed enum sharing one uniform
//! `advance` operation over the same match state shape.
//!
//! ## Ownership
//!
//! [`session::Session`] is the single owner of the match state. The embedding
//! application drains received wire messages into
//! [`session::Session::handle_message`] and then calls
//! [`session::Session::tick`] from one loop, so tick mutation and network
//! mutation are never concurrent.
//!
//! ## Timing
//!
//! One tick per rendered frame, with velocities in field units per tick.
//! There is no elapsed-time normalization, so simulation speed is
//! frame-rate coupled.

pub mod authority;
pub mod physics;
pub mod session;
pub mod sync;

pub use authority::Authority;
pub use physics::GameEvent;
pub use session::{Phase, Session, TickOutput};
