//! Reusable countdown used for attack and contact cooldowns.

/// Countdown primitive.
///
/// `remaining` only moves toward zero once started; the timer is ready when
/// it reaches zero or below. A non-positive duration is always ready.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CooldownTimer {
    duration: f32,
    remaining: f32,
}

impl CooldownTimer {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            remaining: 0.0,
        }
    }

    pub fn start(&mut self) {
        self.remaining = self.duration;
    }

    pub fn tick(&mut self, dt: f32) {
        if self.remaining > 0.0 {
            self.remaining -= dt;
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    /// 0 right after `start`, 1 when ready.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (1.0 - self.remaining / self.duration).clamp(0.0, 1.0)
    }

    pub fn time_remaining(&self) -> f32 {
        self.remaining.max(0.0)
    }

    /// Make the timer ready immediately.
    pub fn reset(&mut self) {
        self.remaining = 0.0;
    }

    /// Applies to the next `start`; a running countdown keeps its remaining time.
    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration;
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_timer_is_ready() {
        let t = CooldownTimer::new(2.0);
        assert!(t.is_ready());
        assert_eq!(t.progress(), 1.0);
    }

    #[test]
    fn becomes_ready_exactly_when_cumulative_time_crosses_duration() {
        for &(d, dt) in &[(1.0_f32, 0.1_f32), (3.0, 0.25), (0.5, 0.016), (2.0, 0.3)] {
            let mut t = CooldownTimer::new(d);
            t.start();
            let mut total = 0.0_f32;
            let mut steps = 0;
            while !t.is_ready() {
                assert!(total < d + 1e-4, "ready too late: d={d} total={total}");
                t.tick(dt);
                total += dt;
                steps += 1;
                assert!(steps < 10_000);
            }
            assert!(total + 1e-4 >= d, "ready too early: d={d} total={total}");
        }
    }

    #[test]
    fn progress_moves_from_zero_to_one() {
        let mut t = CooldownTimer::new(2.0);
        t.start();
        assert_eq!(t.progress(), 0.0);
        t.tick(1.0);
        assert!((t.progress() - 0.5).abs() < 1e-6);
        t.tick(5.0);
        assert_eq!(t.progress(), 1.0);
        assert_eq!(t.time_remaining(), 0.0);
    }

    #[test]
    fn degenerate_duration_is_always_ready() {
        let mut t = CooldownTimer::new(0.0);
        t.start();
        assert!(t.is_ready());
        assert_eq!(t.progress(), 1.0);

        let mut t = CooldownTimer::new(-1.0);
        t.start();
        assert!(t.is_ready());
        assert!(t.progress().is_finite());
    }

    #[test]
    fn set_duration_does_not_touch_running_countdown() {
        let mut t = CooldownTimer::new(2.0);
        t.start();
        t.set_duration(10.0);
        assert!((t.time_remaining() - 2.0).abs() < 1e-6);

        t.tick(2.0);
        assert!(t.is_ready());

        t.start();
        assert!((t.time_remaining() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn reset_makes_ready() {
        let mut t = CooldownTimer::new(4.0);
        t.start();
        t.reset();
        assert!(t.is_ready());
    }
}
