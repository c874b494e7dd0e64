//! # Netpong Application Library
//!
//! Everything around the match engine that turns it into a playable program:
//! the TCP peer transport, pointer/keyboard input capture, and the window
//! renderer. The binary in `main.rs` wires these to an [`engine::Session`]
//! inside one frame loop.
//!
//! ## Module Organization
//!
//! ### Transport Module (`transport`)
//! Ordered, reliable peer link over a single TCP connection, with
//! length-prefixed bincode frames. Runs on a background tokio runtime and is
//! bridged to the frame loop through unbounded channels, so the loop stays
//! the only mutator of game state.
//!
//! ### Input Module (`input`)
//! Samples the pointer and movement keys once per frame and produces the
//! desired local paddle offset.
//!
//! ### Render Module (`render`)
//! Pull-based drawing of the current session state. The engine never pushes
//! drawing commands; this module reads whatever the session exposes.

pub mod input;
pub mod render;
pub mod transport;
