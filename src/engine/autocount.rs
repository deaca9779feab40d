use std::time::{Duration, Instant};

/// Wall-clock auto-count cadence. No internal thread — the owner polls it
/// from the UI tick, the way the rest of the event loop runs.
///
/// At most one deadline is live at a time: every configuration change goes
/// through `rearm`, which replaces the previous schedule wholesale.
#[derive(Debug, Clone)]
pub struct AutoCounter {
    base_interval: Duration,
    period: Duration,
    deadline: Option<Instant>,
}

impl AutoCounter {
    pub fn new(base_interval: Duration) -> Self {
        Self {
            base_interval,
            period: base_interval,
            deadline: None,
        }
    }

    /// Cancel-then-restart. Armed only while playback is live and auto-count
    /// is on; the period is the base interval divided by the playback speed.
    pub fn rearm(&mut self, armed: bool, speed: f64, now: Instant) {
        if !armed || speed <= 0.0 {
            self.deadline = None;
            return;
        }
        self.period = Duration::from_secs_f64(self.base_interval.as_secs_f64() / speed);
        self.deadline = Some(now + self.period);
    }

    /// Number of whole periods elapsed since the last poll. Each one maps to
    /// exactly one increment; the deadline advances by a full period per fire
    /// so cadence does not drift with poll jitter.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let mut fires = 0;
        while let Some(deadline) = self.deadline {
            if now < deadline {
                break;
            }
            fires += 1;
            self.deadline = Some(deadline + self.period);
        }
        fires
    }
}
