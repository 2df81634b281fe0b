use std::collections::HashMap;

use tracing::debug;

/// Per-participant trigger rate limit.
///
/// A trigger arriving less than `min_interval` seconds after the same
/// participant's last accepted trigger is rejected. Rejected triggers do not
/// reset the window. Participants silent for longer than the idle timeout
/// are forgotten by [`prune`](Self::prune).
#[derive(Debug, Clone)]
pub struct TriggerGate {
    min_interval: f64,
    idle_timeout: f64,
    last_accepted: HashMap<String, f64>,
}

impl TriggerGate {
    pub fn new(min_interval: f64) -> Self {
        Self {
            min_interval: min_interval.max(0.0),
            idle_timeout: 0.0,
            last_accepted: HashMap::new(),
        }
    }

    /// Forget participants idle for `seconds`. Zero keeps them forever.
    pub fn with_idle_timeout(mut self, seconds: f64) -> Self {
        self.idle_timeout = seconds.max(0.0);
        self
    }

    pub fn accept(&mut self, participant: &str, now: f64) -> bool {
        if let Some(&last) = self.last_accepted.get(participant) {
            if now - last < self.min_interval {
                debug!(participant, "trigger rate-limited");
                return false;
            }
        }
        self.last_accepted.insert(participant.to_string(), now);
        true
    }

    /// Drop a participant's history, e.g. when they leave.
    pub fn forget(&mut self, participant: &str) -> bool {
        self.last_accepted.remove(participant).is_some()
    }

    /// Drop everyone whose last accepted trigger is older than the idle
    /// timeout. Returns how many were dropped.
    pub fn prune(&mut self, now: f64) -> usize {
        if self.idle_timeout <= 0.0 {
            return 0;
        }
        let before = self.last_accepted.len();
        let idle = self.idle_timeout;
        self.last_accepted.retain(|_, last| now - *last < idle);

        let pruned = before - self.last_accepted.len();
        if pruned > 0 {
            debug!(pruned, "idle participants forgotten");
        }
        pruned
    }

    pub fn tracked(&self) -> usize {
        self.last_accepted.len()
    }
}
