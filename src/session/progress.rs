//! Cosmetic progress for single submissions.
//! The generation service has no progress channel, so the value only says
//! how long the call has been running. It climbs in fixed steps and stays
//! below 100 until the response is in.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ProgressSettings {
    pub interval_ms: u64,
    pub step: u8,
    pub cap: u8,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            interval_ms: 500,
            step: 5,
            cap: 90,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProgressTicker {
    started: Instant,
    interval: Duration,
    step: u8,
    cap: u8,
}

impl ProgressTicker {
    pub fn start(now: Instant, settings: &ProgressSettings) -> Self {
        Self {
            started: now,
            interval: Duration::from_millis(settings.interval_ms.max(1)),
            step: settings.step,
            cap: settings.cap.min(99),
        }
    }

    pub fn value(&self, now: Instant) -> u8 {
        let elapsed = now.saturating_duration_since(self.started);
        let ticks = elapsed.as_millis() / self.interval.as_millis();
        let value = ticks.saturating_mul(self.step as u128);
        value.min(self.cap as u128) as u8
    }
}
