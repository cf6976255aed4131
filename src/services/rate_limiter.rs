use std::time::Duration;
use tokio::time::sleep;

/// Per-run request counter with a mandatory cooldown at the cap
///
/// The provider degrades deterministically past its hourly quota, so the
/// pause is preventive rather than a reaction to an observed throttle. The
/// sleep happens on the single thread of control; no further provider calls
/// are issued until it ends, after which the counter restarts from zero.
pub struct RequestQuota {
    used: u32,
    cap: u32,
    cooldown: Duration,
    pauses: u32,
}

impl RequestQuota {
    pub fn new(cap: u32, cooldown: Duration) -> Self {
        Self {
            used: 0,
            cap,
            cooldown,
            pauses: 0,
        }
    }

    /// Count one provider interaction; block for the cooldown at the cap.
    pub async fn note_request(&mut self) {
        self.used += 1;

        if self.used >= self.cap {
            tracing::info!(
                requests = self.used,
                cooldown_secs = self.cooldown.as_secs(),
                "Request cap reached, pausing"
            );
            sleep(self.cooldown).await;
            self.used = 0;
            self.pauses += 1;
        }
    }

    /// Requests counted since the last pause
    pub fn used(&self) -> u32 {
        self.used
    }

    /// Cooldown pauses taken this run
    pub fn pauses(&self) -> u32 {
        self.pauses
    }
}
