//! Volume scale conversion and fade stepping
//!
//! The session keeps volume as an internal gain in 0.0-2.0; the externally
//! visible value is a percentage where 50% maps to unity gain. Fades are
//! computed by a pure [`FadePlan`] the session drives on a timer.

/// Convert an external volume percentage to the internal gain scale
///
/// 0% -> 0.0, 50% -> 1.0, 100% -> 2.0
pub fn gain_from_percent(percent: u8) -> f64 {
    f64::from(percent) / 50.0
}

/// Convert an internal gain back to the external percentage
pub fn percent_from_gain(gain: f64) -> u8 {
    (gain * 50.0).round() as u8
}

/// One tick of a fade
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeStep {
    /// Fade still in progress; apply this gain
    Intermediate(f64),

    /// Fade reached the target; this is exactly the target gain
    Settled(f64),
}

/// Linear gain transition toward a target
///
/// Steps by a fixed magnitude in the sign direction of the transition and
/// snaps exactly to the target once within one step of it. Guaranteed to
/// settle after at most `|target - start| / step + 1` ticks.
#[derive(Debug, Clone)]
pub struct FadePlan {
    current: f64,
    target: f64,
    step: f64,
}

impl FadePlan {
    /// Plan a fade from `current` toward `target` with the given step magnitude
    pub fn new(current: f64, target: f64, step: f64) -> Self {
        let step = if target >= current {
            step.abs()
        } else {
            -step.abs()
        };
        Self {
            current,
            target,
            step,
        }
    }

    /// The gain the fade is heading for
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Advance the fade by one tick
    pub fn advance(&mut self) -> FadeStep {
        if (self.target - self.current).abs() <= self.step.abs() + f64::EPSILON {
            self.current = self.target;
            return FadeStep::Settled(self.target);
        }
        self.current += self.step;
        FadeStep::Intermediate(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_gain_round_trip() {
        assert!((gain_from_percent(0) - 0.0).abs() < f64::EPSILON);
        assert!((gain_from_percent(50) - 1.0).abs() < f64::EPSILON);
        assert!((gain_from_percent(100) - 2.0).abs() < f64::EPSILON);

        for percent in [0u8, 25, 40, 50, 80, 100] {
            assert_eq!(percent_from_gain(gain_from_percent(percent)), percent);
        }
    }

    #[test]
    fn ascending_fade_is_monotonic_and_settles_on_target() {
        let mut plan = FadePlan::new(0.8, 1.6, 0.05);
        let mut previous = 0.8;

        loop {
            match plan.advance() {
                FadeStep::Intermediate(gain) => {
                    assert!(gain > previous, "fade went backwards");
                    previous = gain;
                }
                FadeStep::Settled(gain) => {
                    assert!((gain - 1.6).abs() < f64::EPSILON);
                    break;
                }
            }
        }
    }

    #[test]
    fn descending_fade_settles_on_target() {
        let mut plan = FadePlan::new(1.6, 0.4, 0.05);
        let mut ticks = 0;

        loop {
            ticks += 1;
            assert!(ticks < 100, "fade failed to terminate");
            match plan.advance() {
                FadeStep::Intermediate(gain) => assert!(gain < 1.6),
                FadeStep::Settled(gain) => {
                    assert!((gain - 0.4).abs() < f64::EPSILON);
                    break;
                }
            }
        }
    }

    #[test]
    fn zero_distance_fade_settles_immediately() {
        let mut plan = FadePlan::new(1.0, 1.0, 0.05);
        assert_eq!(plan.advance(), FadeStep::Settled(1.0));
    }

    #[test]
    fn sub_step_distance_snaps_to_target() {
        let mut plan = FadePlan::new(1.0, 1.02, 0.05);
        assert_eq!(plan.advance(), FadeStep::Settled(1.02));
    }
}
