//! Adaptive poll schedule
//!
//! Continuous mode re-checks on a cadence that reacts to IP stability. The schedule
//! holds the count of consecutive checks that saw no change:
//!
//! - zero: an IP change (or a failed check) was just observed, or the process just
//!   started
//! - positive: the IP has been stable for that many checks
//!
//! With adaptive mode on, a change resets to the minimum interval and each stable
//! check grows the interval quadratically toward the maximum:
//!
//! ```text
//! next = min(min_interval + min(stable² × 5s, max_interval − min_interval), max_interval)
//! ```
//!
//! which gives 30s, 35s, 50s, 75s, 110s, ... capped at 5 minutes with the defaults.
//! With adaptive mode off the fixed interval is always used.

use std::time::Duration;

use crate::config::PollConfig;

/// Growth per squared stable check
pub const STABLE_STEP_MS: u64 = 5_000;

/// Outcome of one check, as seen by the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTransition {
    /// Detected IP equals the last known IP
    Stable,
    /// The IP moved and the record was updated
    Changed,
    /// The check failed; treated like `Changed` for the interval
    Errored,
}

/// Interval calculator for continuous mode
#[derive(Debug, Clone)]
pub struct PollSchedule {
    config: PollConfig,
    stable_checks: u64,
}

impl PollSchedule {
    pub fn new(config: PollConfig) -> Self {
        Self {
            config,
            stable_checks: 0,
        }
    }

    /// Consecutive stable checks so far
    pub fn stable_checks(&self) -> u64 {
        self.stable_checks
    }

    /// Record a transition and return how long to wait before the next check
    pub fn next_interval(&mut self, transition: PollTransition) -> Duration {
        match transition {
            PollTransition::Stable => {
                self.stable_checks = self.stable_checks.saturating_add(1);
            }
            PollTransition::Changed | PollTransition::Errored => {
                self.stable_checks = 0;
            }
        }

        if !self.config.adaptive {
            return Duration::from_millis(self.config.interval_ms);
        }

        Duration::from_millis(adaptive_interval_ms(
            self.stable_checks,
            self.config.min_interval_ms,
            self.config.max_interval_ms,
        ))
    }
}

/// Interval for a given stable-check count
pub fn adaptive_interval_ms(stable_checks: u64, min_interval_ms: u64, max_interval_ms: u64) -> u64 {
    let span = max_interval_ms.saturating_sub(min_interval_ms);
    let growth = stable_checks
        .saturating_mul(stable_checks)
        .saturating_mul(STABLE_STEP_MS)
        .min(span);
    min_interval_ms.saturating_add(growth).min(max_interval_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adaptive() -> PollConfig {
        PollConfig {
            interval_ms: 60_000,
            adaptive: true,
            min_interval_ms: 30_000,
            max_interval_ms: 300_000,
        }
    }

    #[test]
    fn quadratic_ramp_from_minimum() {
        let expected = [30_000, 35_000, 50_000, 75_000, 110_000];
        for (count, want) in expected.iter().enumerate() {
            assert_eq!(adaptive_interval_ms(count as u64, 30_000, 300_000), *want);
        }
    }

    #[test]
    fn ramp_is_capped_at_maximum() {
        assert_eq!(adaptive_interval_ms(8, 30_000, 300_000), 300_000);
        assert_eq!(adaptive_interval_ms(u64::MAX, 30_000, 300_000), 300_000);
    }

    #[test]
    fn stable_checks_grow_and_changes_reset() {
        let mut schedule = PollSchedule::new(adaptive());

        assert_eq!(schedule.next_interval(PollTransition::Changed), Duration::from_secs(30));
        assert_eq!(schedule.next_interval(PollTransition::Stable), Duration::from_secs(35));
        assert_eq!(schedule.next_interval(PollTransition::Stable), Duration::from_secs(50));
        assert_eq!(schedule.next_interval(PollTransition::Stable), Duration::from_secs(75));
        assert_eq!(schedule.next_interval(PollTransition::Stable), Duration::from_secs(110));
        assert_eq!(schedule.stable_checks(), 4);

        assert_eq!(schedule.next_interval(PollTransition::Errored), Duration::from_secs(30));
        assert_eq!(schedule.stable_checks(), 0);
    }

    #[test]
    fn fixed_interval_when_not_adaptive() {
        let mut schedule = PollSchedule::new(PollConfig {
            adaptive: false,
            ..adaptive()
        });

        for transition in [PollTransition::Changed, PollTransition::Stable, PollTransition::Stable] {
            assert_eq!(schedule.next_interval(transition), Duration::from_secs(60));
        }
        assert_eq!(schedule.stable_checks(), 2);
    }
}
