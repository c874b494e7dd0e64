//! Match lifecycle and wire-protocol dispatch.
//!
//! A [`Session`] is the single owner of the match state. The application
//! drains received messages into [`Session::handle_message`] and calls
//! [`Session::tick`] once per rendered frame from the same loop, which keeps
//! tick mutation and network mutation serialized. Both calls return a
//! [`TickOutput`] of wire messages to send and sound cues to play; the
//! session itself never touches a socket or a speaker.

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{MatchState, Message, Side, SoundCue};

use crate::authority::Authority;
use crate::physics::{self, GameEvent};
use crate::sync;

/// Winner identity used for the scripted opponent in single-player matches.
pub const SCRIPTED_OPPONENT_NAME: &str = "CPU";

/// Session-level state machine. `Playing` is entered only after role
/// selection and, for networked roles, a completed identity handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Menu,
    HostWaiting,
    Joining,
    Playing,
    GameOver,
}

/// Side effects of one tick or one received message: wire messages for the
/// transport and cues for the audio collaborator, in emission order.
#[derive(Debug, Default)]
pub struct TickOutput {
    pub outgoing: Vec<Message>,
    pub sounds: Vec<SoundCue>,
}

pub struct Session {
    phase: Phase,
    local_name: String,
    peer_name: Option<String>,
    identity_sent: bool,
    authority: Option<Authority>,
    state: Option<MatchState>,
    winner: Option<String>,
}

impl Session {
    pub fn new(local_name: impl Into<String>) -> Self {
        Session {
            phase: Phase::Menu,
            local_name: local_name.into(),
            peer_name: None,
            identity_sent: false,
            authority: None,
            state: None,
            winner: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn match_state(&self) -> Option<&MatchState> {
        self.state.as_ref()
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn peer_name(&self) -> Option<&str> {
        self.peer_name.as_deref()
    }

    pub fn winner_name(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    /// The paddle steered by local input, once a role is active.
    pub fn local_side(&self) -> Option<Side> {
        self.authority.as_ref().map(|a| a.local_side())
    }

    /// Starts an offline match against the scripted opponent. No handshake,
    /// no network traffic.
    pub fn start_single(&mut self) -> TickOutput {
        let mut out = TickOutput::default();
        let mut rng = StdRng::from_entropy();

        let mut state = MatchState::new();
        physics::serve(&mut state, None, &mut rng);

        self.state = Some(state);
        self.authority = Some(Authority::single(rng));
        self.winner = None;
        self.phase = Phase::Playing;
        out.sounds.push(SoundCue::GameStart);

        info!("Single-player match started as {}", self.local_name);
        out
    }

    /// Enters the host-side wait for a peer. The match itself starts when
    /// the identity handshake completes.
    pub fn start_host(&mut self) {
        info!("Hosting, waiting for an opponent");
        self.begin_handshake(Phase::HostWaiting);
    }

    /// Enters the join-side wait for the handshake to complete.
    pub fn start_join(&mut self) {
        info!("Joining a hosted match");
        self.begin_handshake(Phase::Joining);
    }

    fn begin_handshake(&mut self, phase: Phase) {
        self.phase = phase;
        self.peer_name = None;
        self.identity_sent = false;
        self.authority = None;
        self.state = None;
        self.winner = None;
    }

    /// Called once the transport reports an open connection. Sends our
    /// identity; simulation stays gated until the peer's arrives too.
    pub fn transport_opened(&mut self) -> TickOutput {
        let mut out = TickOutput::default();
        if matches!(self.phase, Phase::HostWaiting | Phase::Joining) && !self.identity_sent {
            out.outgoing.push(Message::Identity {
                name: self.local_name.clone(),
            });
            self.identity_sent = true;
            self.maybe_begin_match(&mut out);
        }
        out
    }

    /// Transport-level failure: no retry, fall back to the pre-match state.
    pub fn transport_failed(&mut self, reason: &str) {
        warn!("Transport failed: {}", reason);
        self.leave();
    }

    /// Explicit return-to-menu. The caller tears down the transport.
    pub fn leave(&mut self) {
        info!("Returning to menu");
        self.phase = Phase::Menu;
        self.peer_name = None;
        self.identity_sent = false;
        self.authority = None;
        self.state = None;
        self.winner = None;
    }

    /// Applies one received wire message. The peer is trusted: payloads are
    /// not validated beyond decoding, messages are only checked against the
    /// active role.
    pub fn handle_message(&mut self, message: Message) -> TickOutput {
        let mut out = TickOutput::default();
        match message {
            Message::Identity { name } => {
                if matches!(self.phase, Phase::HostWaiting | Phase::Joining) {
                    info!("Peer identified as {}", name);
                    self.peer_name = Some(name);
                    self.maybe_begin_match(&mut out);
                } else {
                    warn!("Ignoring identity message outside handshake");
                }
            }
            Message::Input { paddle_offset } => match self.authority.as_mut() {
                Some(authority @ Authority::Host { .. }) => {
                    authority.record_remote_input(paddle_offset);
                }
                _ => warn!("Ignoring input message, not hosting"),
            },
            Message::State { snapshot } => {
                match (self.state.as_mut(), self.authority.as_ref()) {
                    (Some(state), Some(Authority::Client)) => {
                        sync::apply_snapshot(state, &snapshot);
                    }
                    _ => warn!("Ignoring state snapshot, not a client"),
                }
            }
            Message::Sound { cue } => {
                // Host-authoritative effects apply unconditionally.
                out.sounds.push(cue);
            }
            Message::Over { winner } => {
                info!("Match over, {} wins", winner);
                if let Some(state) = self.state.as_mut() {
                    state.running = false;
                    state.game_over = true;
                }
                self.winner = Some(winner);
                self.phase = Phase::GameOver;
                out.sounds.push(SoundCue::GameOver);
            }
        }
        out
    }

    /// Runs one simulation tick for the active role. Does nothing outside
    /// `Playing`, which is also what freezes the field once a match ends.
    pub fn tick(&mut self, local_offset: f32) -> TickOutput {
        let mut out = TickOutput::default();
        if self.phase != Phase::Playing {
            return out;
        }
        let (Some(state), Some(authority)) = (self.state.as_mut(), self.authority.as_mut()) else {
            return out;
        };

        let mut events = Vec::new();
        authority.advance(state, local_offset, &mut events);

        let local_side = authority.local_side();
        let replicate = matches!(authority, Authority::Host { .. });

        match authority {
            // The full authoritative state goes out after every host tick.
            Authority::Host { .. } => out.outgoing.push(Message::State {
                snapshot: state.snapshot(),
            }),
            Authority::Client => out.outgoing.push(Message::Input {
                paddle_offset: state.paddle(Side::Right),
            }),
            Authority::Single { .. } => {}
        }

        for event in &events {
            match event {
                GameEvent::WallHit => {
                    out.sounds.push(SoundCue::WallHit);
                    if replicate {
                        out.outgoing.push(Message::Sound {
                            cue: SoundCue::WallHit,
                        });
                    }
                }
                GameEvent::PaddleHit => {
                    out.sounds.push(SoundCue::PaddleHit);
                    if replicate {
                        out.outgoing.push(Message::Sound {
                            cue: SoundCue::PaddleHit,
                        });
                    }
                }
                GameEvent::Scored { by } => {
                    let scored_local = *by == local_side;
                    out.sounds.push(if scored_local {
                        SoundCue::ScoreSelf
                    } else {
                        SoundCue::ScoreOpponent
                    });
                    if replicate {
                        // Score cues are perspective-relative, so the copy
                        // replicated to the peer is flipped.
                        out.outgoing.push(Message::Sound {
                            cue: if scored_local {
                                SoundCue::ScoreOpponent
                            } else {
                                SoundCue::ScoreSelf
                            },
                        });
                    }
                }
                GameEvent::Won { by } => {
                    let winner_name = if *by == local_side {
                        self.local_name.clone()
                    } else {
                        self.peer_name
                            .clone()
                            .unwrap_or_else(|| SCRIPTED_OPPONENT_NAME.to_string())
                    };
                    self.winner = Some(winner_name.clone());
                    self.phase = Phase::GameOver;
                    out.sounds.push(SoundCue::GameOver);
                    if replicate {
                        out.outgoing.push(Message::Over {
                            winner: winner_name,
                        });
                    }
                }
            }
        }

        out
    }

    fn maybe_begin_match(&mut self, out: &mut TickOutput) {
        if !self.identity_sent || self.peer_name.is_none() {
            return;
        }

        let authority = match self.phase {
            Phase::HostWaiting => {
                let mut rng = StdRng::from_entropy();
                let mut state = MatchState::new();
                physics::serve(&mut state, None, &mut rng);
                self.state = Some(state);
                Authority::host(rng)
            }
            Phase::Joining => {
                // The client starts from a resting centered ball; the first
                // snapshot supplies the real trajectory.
                self.state = Some(MatchState::new());
                Authority::client()
            }
            _ => return,
        };

        self.authority = Some(authority);
        self.winner = None;
        self.phase = Phase::Playing;
        out.sounds.push(SoundCue::GameStart);

        info!(
            "Handshake complete: {} vs {}",
            self.local_name,
            self.peer_name.as_deref().unwrap_or("?")
        );
    }
}
