//! Pull-based window rendering of the current session state.

use engine::{Phase, Session};
use macroquad::prelude::*;
use shared::{
    paddle_x, MatchState, Side, SoundCue, BALL_SIZE, FIELD_HEIGHT, FIELD_WIDTH, PADDLE_HEIGHT,
    PADDLE_WIDTH,
};

const BACKGROUND: Color = Color::new(0.05, 0.05, 0.07, 1.0);
const FOREGROUND: Color = Color::new(0.9, 0.9, 0.9, 1.0);
const DIMMED: Color = Color::new(0.45, 0.45, 0.45, 1.0);

pub struct Renderer {
    flash: f32,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer { flash: 0.0 }
    }

    /// Score cues get a brief full-screen flash; everything else only goes
    /// to the audio collaborator.
    pub fn note_sounds(&mut self, cues: &[SoundCue]) {
        if cues
            .iter()
            .any(|c| matches!(c, SoundCue::ScoreSelf | SoundCue::ScoreOpponent))
        {
            self.flash = 1.0;
        }
    }

    pub fn draw(&mut self, session: &Session) {
        clear_background(BACKGROUND);

        match session.phase() {
            Phase::Menu => self.draw_menu(session),
            Phase::HostWaiting => {
                self.draw_banner("WAITING FOR OPPONENT", "share your address to start")
            }
            Phase::Joining => self.draw_banner("CONNECTING", "waiting for the host"),
            Phase::Playing => {
                if let Some(state) = session.match_state() {
                    self.draw_field(state, session.local_side());
                }
            }
            Phase::GameOver => {
                if let Some(state) = session.match_state() {
                    self.draw_field(state, session.local_side());
                }
                let winner = session.winner_name().unwrap_or("?");
                self.draw_banner(&format!("{} WINS", winner), "esc to leave");
            }
        }

        if self.flash > 0.0 {
            draw_rectangle(
                0.0,
                0.0,
                FIELD_WIDTH,
                FIELD_HEIGHT,
                Color::new(1.0, 1.0, 1.0, self.flash * 0.18),
            );
            self.flash *= 0.85;
            if self.flash < 0.05 {
                self.flash = 0.0;
            }
        }
    }

    fn draw_menu(&self, session: &Session) {
        self.draw_banner("NETPONG", "1: practice match    esc: quit");
        draw_text(
            &format!("playing as {}", session.local_name()),
            20.0,
            FIELD_HEIGHT - 20.0,
            20.0,
            DIMMED,
        );
    }

    fn draw_banner(&self, title: &str, subtitle: &str) {
        let title_size = 48.0;
        let title_width = measure_text(title, None, title_size as u16, 1.0).width;
        draw_text(
            title,
            (FIELD_WIDTH - title_width) / 2.0,
            FIELD_HEIGHT / 2.0 - 30.0,
            title_size,
            FOREGROUND,
        );

        let sub_size = 20.0;
        let sub_width = measure_text(subtitle, None, sub_size as u16, 1.0).width;
        draw_text(
            subtitle,
            (FIELD_WIDTH - sub_width) / 2.0,
            FIELD_HEIGHT / 2.0 + 10.0,
            sub_size,
            DIMMED,
        );
    }

    fn draw_field(&self, state: &MatchState, local_side: Option<Side>) {
        // Dashed center line.
        let dash = 14.0;
        let mut y = 0.0;
        while y < FIELD_HEIGHT {
            draw_rectangle(FIELD_WIDTH / 2.0 - 1.0, y, 2.0, dash / 2.0, DIMMED);
            y += dash;
        }

        for side in [Side::Left, Side::Right] {
            let color = if local_side == Some(side) {
                FOREGROUND
            } else {
                DIMMED
            };
            draw_rectangle(
                paddle_x(side),
                state.paddle(side),
                PADDLE_WIDTH,
                PADDLE_HEIGHT,
                color,
            );
        }

        draw_rectangle(
            state.ball.x - BALL_SIZE / 2.0,
            state.ball.y - BALL_SIZE / 2.0,
            BALL_SIZE,
            BALL_SIZE,
            FOREGROUND,
        );

        let score = format!("{}   {}", state.score_left, state.score_right);
        let size = 40.0;
        let width = measure_text(&score, None, size as u16, 1.0).width;
        draw_text(&score, (FIELD_WIDTH - width) / 2.0, 50.0, size, FOREGROUND);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
