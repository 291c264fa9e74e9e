use std::time::{Duration, Instant};

/// Quartic in/out easing, `t` in `[0, 1]`.
pub fn quart_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        8.0 * t.powi(4)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
    }
}

#[derive(Debug, Clone, Copy)]
struct Tween {
    from: f64,
    to: f64,
    start: Instant,
    duration: Duration,
}

impl Tween {
    fn sample(&self, now: Instant) -> (f64, bool) {
        let elapsed = now.saturating_duration_since(self.start);
        if elapsed >= self.duration {
            return (self.to, true);
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        (self.from + (self.to - self.from) * quart_in_out(t), false)
    }
}

/// The knob's rotation angle in degrees, mutated only through timed tweens.
///
/// A retarget while a tween is in flight starts the new tween from whatever
/// angle the old one had reached at that instant, so the knob never jumps.
#[derive(Debug, Clone)]
pub struct RotationState {
    angle: f64,
    tween: Option<Tween>,
}

impl RotationState {
    pub fn new() -> Self {
        Self {
            angle: 0.0,
            tween: None,
        }
    }

    /// Current angle in degrees, as of the last `advance` or retarget.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Angle the state is heading toward (the current angle when idle).
    pub fn target(&self) -> f64 {
        self.tween.map_or(self.angle, |t| t.to)
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Starts a tween from the in-flight angle at `now` toward `target`.
    pub fn retarget(&mut self, target: f64, now: Instant, duration: Duration) {
        self.advance(now);
        if duration.is_zero() {
            self.angle = target;
            self.tween = None;
            return;
        }
        self.tween = Some(Tween {
            from: self.angle,
            to: target,
            start: now,
            duration,
        });
    }

    /// Advances the tween to `now`, returning the resulting angle.
    pub fn advance(&mut self, now: Instant) -> f64 {
        if let Some(tween) = self.tween {
            let (angle, done) = tween.sample(now);
            self.angle = angle;
            if done {
                self.tween = None;
            }
        }
        self.angle
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DURATION: Duration = Duration::from_millis(500);

    #[test]
    fn easing_endpoints_and_midpoint() {
        assert_eq!(quart_in_out(0.0), 0.0);
        assert_eq!(quart_in_out(1.0), 1.0);
        assert!((quart_in_out(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn easing_is_symmetric_about_midpoint() {
        for i in 0..=20 {
            let t = i as f64 / 20.0;
            assert!((quart_in_out(t) + quart_in_out(1.0 - t) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn easing_is_monotonic() {
        let mut prev = quart_in_out(0.0);
        for i in 1..=100 {
            let next = quart_in_out(i as f64 / 100.0);
            assert!(next >= prev);
            prev = next;
        }
    }

    #[test]
    fn tween_reaches_target_after_duration() {
        let start = Instant::now();
        let mut state = RotationState::new();
        state.retarget(45.0, start, DURATION);
        assert!(state.is_animating());
        assert_eq!(state.advance(start + DURATION), 45.0);
        assert!(!state.is_animating());
    }

    #[test]
    fn tween_holds_start_angle_at_time_zero() {
        let start = Instant::now();
        let mut state = RotationState::new();
        state.retarget(-45.0, start, DURATION);
        assert_eq!(state.advance(start), 0.0);
    }

    #[test]
    fn midpoint_of_tween_is_halfway() {
        let start = Instant::now();
        let mut state = RotationState::new();
        state.retarget(90.0, start, DURATION);
        let angle = state.advance(start + DURATION / 2);
        assert!((angle - 45.0).abs() < 1e-6);
    }

    #[test]
    fn retarget_captures_in_flight_angle() {
        let start = Instant::now();
        let mut state = RotationState::new();
        state.retarget(90.0, start, DURATION);

        // interrupt halfway through, heading the other way
        let midway = start + DURATION / 2;
        state.retarget(-90.0, midway, DURATION);
        assert!((state.angle() - 45.0).abs() < 1e-6);
        assert_eq!(state.target(), -90.0);

        // no discontinuity at the moment of interruption
        let angle = state.advance(midway);
        assert!((angle - 45.0).abs() < 1e-6);

        // and the new tween still lands exactly on its target
        assert_eq!(state.advance(midway + DURATION), -90.0);
    }

    #[test]
    fn zero_duration_snaps_to_target() {
        let start = Instant::now();
        let mut state = RotationState::new();
        state.retarget(30.0, start, Duration::ZERO);
        assert_eq!(state.angle(), 30.0);
        assert!(!state.is_animating());
    }

    #[test]
    fn idle_target_is_current_angle() {
        let state = RotationState::new();
        assert_eq!(state.target(), 0.0);
    }
}
