use shared::{MatchState, Side, Snapshot, SNAP_DISTANCE};

/// Fraction of the remaining position error removed per received snapshot.
/// First-order low-pass, not time-scaled.
const BLEND_FACTOR: f32 = 0.5;

/// Client-side dead reckoning between snapshots: position advances along the
/// last known velocity. Velocity itself is only ever refreshed by a snapshot.
pub fn extrapolate(state: &mut MatchState) {
    state.ball.x += state.ball.dx;
    state.ball.y += state.ball.dy;
}

/// Reconciles the predicted state against an authoritative snapshot.
///
/// Scores and the host-controlled paddle are overwritten outright. The ball
/// position snaps when the prediction has diverged past SNAP_DISTANCE (a
/// reset or score happened on the host), otherwise it converges geometrically
/// by BLEND_FACTOR per snapshot. Velocity is always overwritten so further
/// extrapolation tracks the authoritative trajectory while the position is
/// still catching up. The local (right) paddle is left alone.
pub fn apply_snapshot(state: &mut MatchState, snapshot: &Snapshot) {
    state.score_left = snapshot.score_left;
    state.score_right = snapshot.score_right;
    state.set_paddle(Side::Left, snapshot.paddle_left);

    let distance = state.ball.distance_to(snapshot.ball.x, snapshot.ball.y);
    if distance > SNAP_DISTANCE {
        state.ball.x = snapshot.ball.x;
        state.ball.y = snapshot.ball.y;
    } else {
        state.ball.x += (snapshot.ball.x - state.ball.x) * BLEND_FACTOR;
        state.ball.y += (snapshot.ball.y - state.ball.y) * BLEND_FACTOR;
    }

    state.ball.dx = snapshot.ball.dx;
    state.ball.dy = snapshot.ball.dy;
    state.ball.speed = snapshot.ball.speed;
}
