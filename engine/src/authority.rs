use rand::rngs::StdRng;
use shared::{MatchState, Side, PADDLE_START_OFFSET};

use crate::physics::{self, GameEvent};
use crate::sync;

/// Who computes truth for the running match. A closed set of variants
/// sharing one `advance` operation over the same match state shape.
#[derive(Debug)]
pub enum Authority {
    /// Scripted opponent on the right paddle, full local physics, no network.
    Single { rng: StdRng },
    /// Full local physics; the right paddle follows the peer's last reported
    /// offset, held at center until the first input message arrives.
    Host { rng: StdRng, remote_paddle: f32 },
    /// No wall/paddle/scoring logic; extrapolates the ball along its last
    /// known velocity and conforms to received snapshots.
    Client,
}

impl Authority {
    pub fn single(rng: StdRng) -> Self {
        Authority::Single { rng }
    }

    pub fn host(rng: StdRng) -> Self {
        Authority::Host {
            rng,
            remote_paddle: PADDLE_START_OFFSET,
        }
    }

    pub fn client() -> Self {
        Authority::Client
    }

    /// The paddle this role steers with local input.
    pub fn local_side(&self) -> Side {
        match self {
            Authority::Single { .. } | Authority::Host { .. } => Side::Left,
            Authority::Client => Side::Right,
        }
    }

    pub fn is_authoritative(&self) -> bool {
        !matches!(self, Authority::Client)
    }

    /// Stores the peer's paddle offset for the next tick. Only meaningful on
    /// the host; other roles ignore it.
    pub fn record_remote_input(&mut self, offset: f32) {
        if let Authority::Host { remote_paddle, .. } = self {
            *remote_paddle = offset;
        }
    }

    /// Runs one tick's worth of simulation for this role. Authoritative
    /// roles fill `events`; the client never produces any.
    pub fn advance(
        &mut self,
        state: &mut MatchState,
        local_offset: f32,
        events: &mut Vec<GameEvent>,
    ) {
        match self {
            Authority::Single { rng } => {
                state.set_paddle(Side::Left, local_offset);
                physics::drive_ai(state);
                physics::step(state, rng, events);
            }
            Authority::Host { rng, remote_paddle } => {
                state.set_paddle(Side::Left, local_offset);
                state.set_paddle(Side::Right, *remote_paddle);
                physics::step(state, rng, events);
            }
            Authority::Client => {
                state.set_paddle(Side::Right, local_offset);
                sync::extrapolate(state);
            }
        }
    }
}
