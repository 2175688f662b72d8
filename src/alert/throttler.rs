use std::time::Duration;
use tokio::time::Instant;

use super::Alert;
use crate::snapshot::Status;

/// Observable throttler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlertState {
    /// `None` until the first alert.
    pub last_alert: Option<Instant>,
    pub alerts_emitted: u64,
}

/// Rate-limits tremor alerts. Eligibility returns purely by elapsed time;
/// leaving and re-entering TREMOR inside the cooldown does not re-alert.
#[derive(Debug, Clone)]
pub struct AlertThrottler {
    cooldown: Duration,
    state: AlertState,
}

impl AlertThrottler {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            state: AlertState::default(),
        }
    }

    pub fn on_status_update(&mut self, status: Status, score: u8, now: Instant) -> Option<Alert> {
        if status != Status::Tremor || !self.eligible(now) {
            return None;
        }

        self.state.last_alert = Some(now);
        self.state.alerts_emitted += 1;
        Some(Alert::tremor(score, now))
    }

    fn eligible(&self, now: Instant) -> bool {
        match self.state.last_alert {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.cooldown,
        }
    }

    pub fn state(&self) -> AlertState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_millis(20_000);

    #[test]
    fn first_tremor_alerts_immediately() {
        let mut throttler = AlertThrottler::new(COOLDOWN);
        let now = Instant::now();
        let alert = throttler.on_status_update(Status::Tremor, 80, now).unwrap();
        assert_eq!(alert.status, Status::Tremor);
        assert_eq!(alert.score, 80);
        assert_eq!(throttler.state().last_alert, Some(now));
    }

    #[test]
    fn other_statuses_never_alert() {
        let mut throttler = AlertThrottler::new(COOLDOWN);
        let now = Instant::now();
        for status in [Status::Calm, Status::Fatigue, Status::Unknown] {
            assert!(throttler.on_status_update(status, 50, now).is_none());
        }
        assert_eq!(throttler.state(), AlertState::default());
    }

    #[test]
    fn consecutive_tremors_alert_once_per_window() {
        let mut throttler = AlertThrottler::new(COOLDOWN);
        let start = Instant::now();

        // One tremor snapshot every 100ms for 65 seconds.
        let mut fired = Vec::new();
        for tick in 0..650u64 {
            let now = start + Duration::from_millis(tick * 100);
            if throttler.on_status_update(Status::Tremor, 90, now).is_some() {
                fired.push(tick * 100);
            }
        }

        // Strictly more than 20s must pass, so the next eligible tick is 20.1s.
        assert_eq!(fired, vec![0, 20_100, 40_200, 60_300]);
        assert_eq!(throttler.state().alerts_emitted, 4);
    }

    #[test]
    fn exactly_cooldown_is_not_enough() {
        let mut throttler = AlertThrottler::new(COOLDOWN);
        let start = Instant::now();
        throttler.on_status_update(Status::Tremor, 90, start);
        assert!(throttler
            .on_status_update(Status::Tremor, 90, start + COOLDOWN)
            .is_none());
        assert!(throttler
            .on_status_update(Status::Tremor, 90, start + COOLDOWN + Duration::from_millis(1))
            .is_some());
    }

    #[test]
    fn leaving_tremor_does_not_reset_cooldown() {
        let mut throttler = AlertThrottler::new(COOLDOWN);
        let start = Instant::now();
        throttler.on_status_update(Status::Tremor, 90, start);
        throttler.on_status_update(Status::Calm, 10, start + Duration::from_secs(1));
        assert!(throttler
            .on_status_update(Status::Tremor, 90, start + Duration::from_secs(2))
            .is_none());
    }
}
