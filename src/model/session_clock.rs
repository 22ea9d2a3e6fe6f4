use std::time::Duration;

use serde_with::serde_as;
use serde_with::DurationSecondsWithFrac;

/// Frame-driven puzzle clock. Counts down from `limit` when set, otherwise just
/// accumulates elapsed time. Never reads the wall clock; the host feeds it deltas.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionClock {
    #[serde_as(as = "Option<DurationSecondsWithFrac<f64>>")]
    pub limit: Option<Duration>,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub elapsed: Duration,
    pub paused: bool,
}

impl SessionClock {
    pub fn counting_down(limit: Duration) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }

    pub fn counting_up() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_timed(&self) -> bool {
        self.limit.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        match self.limit {
            Some(limit) => self.elapsed.min(limit),
            None => self.elapsed,
        }
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.limit
            .map(|limit| limit.saturating_sub(self.elapsed))
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|remaining| remaining.is_zero())
    }

    /// Fraction of the limit still left, `None` when untimed.
    pub fn remaining_fraction(&self) -> Option<f64> {
        let limit = self.limit?;
        if limit.is_zero() {
            return Some(0.0);
        }
        self.remaining()
            .map(|remaining| remaining.as_secs_f64() / limit.as_secs_f64())
    }

    pub fn advanced(&self, delta: Duration) -> SessionClock {
        let mut new_state = self.clone();
        if !new_state.paused {
            new_state.elapsed = new_state.elapsed.saturating_add(delta);
            if let Some(limit) = new_state.limit {
                new_state.elapsed = new_state.elapsed.min(limit);
            }
        }
        new_state
    }

    pub fn paused(&self) -> SessionClock {
        let mut new_state = self.clone();
        new_state.paused = true;
        new_state
    }

    pub fn resumed(&self) -> SessionClock {
        let mut new_state = self.clone();
        new_state.paused = false;
        new_state
    }
}
