use rand::Rng;
use shared::{
    paddle_x, MatchState, Side, AI_DEAD_ZONE, AI_STEP, FIELD_HEIGHT, FIELD_WIDTH, MAX_SPEED,
    PADDLE_HEIGHT, PADDLE_WIDTH, SERVE_VERTICAL_FACTOR, SPEED_INCREMENT, SPIN_GAIN, WIN_SCORE,
};

/// Discrete outcomes of one authoritative tick. The session layer maps these
/// to sound cues and, on the host, to replicated wire messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    WallHit,
    PaddleHit,
    Scored { by: Side },
    Won { by: Side },
}

/// Advances the ball by one tick: integration, wall and paddle collisions,
/// scoring, win check, serve reset. Runs only on the authoritative side.
pub fn step<R: Rng>(state: &mut MatchState, rng: &mut R, events: &mut Vec<GameEvent>) {
    state.ball.x += state.ball.dx;
    state.ball.y += state.ball.dy;

    wall_bounce(state, events);
    paddle_bounce(state, events);
    check_goal(state, rng, events);
}

/// Proportional tracker for the scripted opponent on the right paddle.
/// Holds inside the dead zone, otherwise moves a fixed step toward the ball.
pub fn drive_ai(state: &mut MatchState) {
    let delta = state.ball.y - state.paddle_center(Side::Right);
    if delta.abs() > AI_DEAD_ZONE {
        let offset = state.paddle(Side::Right) + AI_STEP * delta.signum();
        state.set_paddle(Side::Right, offset);
    }
}

/// Resets the ball to field center for a new rally. `toward` is the side the
/// serve travels to (the side that was just scored against); `None` picks a
/// random direction for the opening serve. Vertical sign is always random.
pub fn serve<R: Rng>(state: &mut MatchState, toward: Option<Side>, rng: &mut R) {
    state.ball = shared::Ball::centered();

    let direction = match toward {
        Some(Side::Left) => -1.0,
        Some(Side::Right) => 1.0,
        None => {
            if rng.gen::<bool>() {
                1.0
            } else {
                -1.0
            }
        }
    };
    let vertical_sign = if rng.gen::<bool>() { 1.0 } else { -1.0 };

    state.ball.dx = direction * state.ball.speed;
    state.ball.dy = vertical_sign * SERVE_VERTICAL_FACTOR * state.ball.speed;
}

fn wall_bounce(state: &mut MatchState, events: &mut Vec<GameEvent>) {
    let ball = &mut state.ball;
    if ball.y <= 0.0 && ball.dy < 0.0 {
        ball.y = 0.0;
        ball.dy = -ball.dy;
        events.push(GameEvent::WallHit);
    } else if ball.y >= FIELD_HEIGHT && ball.dy > 0.0 {
        ball.y = FIELD_HEIGHT;
        ball.dy = -ball.dy;
        events.push(GameEvent::WallHit);
    }
}

fn paddle_bounce(state: &mut MatchState, events: &mut Vec<GameEvent>) {
    for side in [Side::Left, Side::Right] {
        let (left, top, right, bottom) = state.ball.bounds();
        let px = paddle_x(side);
        let py = state.paddle(side);

        let overlap =
            right > px && left < px + PADDLE_WIDTH && bottom > py && top < py + PADDLE_HEIGHT;
        if !overlap {
            continue;
        }

        // Deflection is proportional to where on the paddle the ball struck.
        let hit_offset = state.ball.y - state.paddle_center(side);
        state.ball.dy = hit_offset / (PADDLE_HEIGHT / 2.0) * SPIN_GAIN;

        if state.ball.speed < MAX_SPEED {
            state.ball.speed += SPEED_INCREMENT;
        }
        state.ball.dx = match side {
            Side::Left => state.ball.speed,
            Side::Right => -state.ball.speed,
        };

        events.push(GameEvent::PaddleHit);
    }
}

fn check_goal<R: Rng>(state: &mut MatchState, rng: &mut R, events: &mut Vec<GameEvent>) {
    let scored_against = if state.ball.x < 0.0 {
        Some(Side::Left)
    } else if state.ball.x > FIELD_WIDTH {
        Some(Side::Right)
    } else {
        None
    };

    if let Some(loser) = scored_against {
        let scorer = loser.opposite();
        state.add_point(scorer);
        events.push(GameEvent::Scored { by: scorer });

        // Win check happens before the serve reset.
        check_win(state, events);
        serve(state, Some(loser), rng);
    }
}

fn check_win(state: &mut MatchState, events: &mut Vec<GameEvent>) {
    if state.game_over {
        return;
    }
    for side in [Side::Left, Side::Right] {
        if state.score(side) >= WIN_SCORE {
            state.game_over = true;
            state.running = false;
            state.winner = Some(side);
            events.push(GameEvent::Won { by: side });
            return;
        }
    }
}
