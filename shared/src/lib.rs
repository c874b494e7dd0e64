use serde::{Deserialize, Serialize};

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 600.0;
pub const PADDLE_WIDTH: f32 = 12.0;
pub const PADDLE_HEIGHT: f32 = 80.0;
pub const PADDLE_INSET: f32 = 24.0;
pub const BALL_SIZE: f32 = 12.0;
pub const SERVE_SPEED: f32 = 5.0;
pub const SPEED_INCREMENT: f32 = 0.5;
pub const MAX_SPEED: f32 = 15.0;
pub const SPIN_GAIN: f32 = 10.0;
pub const SERVE_VERTICAL_FACTOR: f32 = 0.75;
pub const AI_STEP: f32 = 4.5;
pub const AI_DEAD_ZONE: f32 = 10.0;
pub const SNAP_DISTANCE: f32 = 50.0;
pub const WIN_SCORE: u32 = 11;

/// Highest legal paddle offset; offsets live in [0, PADDLE_MAX_OFFSET].
pub const PADDLE_MAX_OFFSET: f32 = FIELD_HEIGHT - PADDLE_HEIGHT;
/// Centered paddle offset, also the assumed peer offset before any input arrives.
pub const PADDLE_START_OFFSET: f32 = PADDLE_MAX_OFFSET / 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Field x of a paddle's left edge. Paddles sit a fixed inset from their field edge.
pub fn paddle_x(side: Side) -> f32 {
    match side {
        Side::Left => PADDLE_INSET,
        Side::Right => FIELD_WIDTH - PADDLE_INSET - PADDLE_WIDTH,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    /// Horizontal-component magnitude. Non-decreasing within a rally, capped
    /// at MAX_SPEED, reset to SERVE_SPEED on each serve.
    pub speed: f32,
}

impl Ball {
    pub fn centered() -> Self {
        Ball {
            x: FIELD_WIDTH / 2.0,
            y: FIELD_HEIGHT / 2.0,
            dx: 0.0,
            dy: 0.0,
            speed: SERVE_SPEED,
        }
    }

    /// Axis-aligned bounding box (left, top, right, bottom) centered on the position.
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        let half = BALL_SIZE / 2.0;
        (self.x - half, self.y - half, self.x + half, self.y + half)
    }

    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone)]
pub struct MatchState {
    pub ball: Ball,
    paddle_left: f32,
    paddle_right: f32,
    pub score_left: u32,
    pub score_right: u32,
    pub running: bool,
    pub game_over: bool,
    pub winner: Option<Side>,
}

impl MatchState {
    pub fn new() -> Self {
        MatchState {
            ball: Ball::centered(),
            paddle_left: PADDLE_START_OFFSET,
            paddle_right: PADDLE_START_OFFSET,
            score_left: 0,
            score_right: 0,
            running: true,
            game_over: false,
            winner: None,
        }
    }

    pub fn paddle(&self, side: Side) -> f32 {
        match side {
            Side::Left => self.paddle_left,
            Side::Right => self.paddle_right,
        }
    }

    /// Writes a paddle offset, clamped to [0, PADDLE_MAX_OFFSET]. All paddle
    /// writes go through here so the bound holds on every tick.
    pub fn set_paddle(&mut self, side: Side, offset: f32) {
        let clamped = offset.clamp(0.0, PADDLE_MAX_OFFSET);
        match side {
            Side::Left => self.paddle_left = clamped,
            Side::Right => self.paddle_right = clamped,
        }
    }

    pub fn paddle_center(&self, side: Side) -> f32 {
        self.paddle(side) + PADDLE_HEIGHT / 2.0
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.score_left,
            Side::Right => self.score_right,
        }
    }

    pub fn add_point(&mut self, side: Side) {
        match side {
            Side::Left => self.score_left += 1,
            Side::Right => self.score_right += 1,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            ball: self.ball,
            paddle_left: self.paddle_left,
            paddle_right: self.paddle_right,
            score_left: self.score_left,
            score_right: self.score_right,
        }
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete authoritative state sent host-to-client every tick while playing.
/// Always the full state, never a delta.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Snapshot {
    pub ball: Ball,
    pub paddle_left: f32,
    pub paddle_right: f32,
    pub score_left: u32,
    pub score_right: u32,
}

/// Effect identifiers handed to the audio collaborator. Score cues are
/// relative to the receiving player's own side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    PaddleHit,
    WallHit,
    ScoreSelf,
    ScoreOpponent,
    GameStart,
    GameOver,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Message {
    Identity { name: String },
    Input { paddle_offset: f32 },
    State { snapshot: Snapshot },
    Sound { cue: SoundCue },
    Over { winner: String },
}
