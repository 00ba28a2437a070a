//! Jittered delays.
//!
//! Every outbound request this worker makes is paced with a randomized delay
//! of `base + uniform(0..spread)` so the traffic never settles into a
//! detectable fixed interval.

use std::time::Duration;

use rand::Rng;

/// Draw a jittered duration of `base + uniform(0..spread)`.
pub fn jittered(base: Duration, spread: Duration) -> Duration {
    if spread.is_zero() {
        return base;
    }
    let extra = rand::thread_rng().gen_range(0.0..spread.as_secs_f64());
    base + Duration::from_secs_f64(extra)
}

/// Sleep for a jittered interval.
pub async fn sleep_jittered(base: Duration, spread: Duration) {
    tokio::time::sleep(jittered(base, spread)).await;
}

/// Sleep for the default inter-request interval (2s base, up to 5s jitter).
pub async fn sleep_default() {
    sleep_jittered(Duration::from_secs(2), Duration::from_secs(5)).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jittered_stays_within_bounds() {
        let base = Duration::from_millis(100);
        let spread = Duration::from_millis(50);
        for _ in 0..200 {
            let d = jittered(base, spread);
            assert!(d >= base);
            assert!(d < base + spread);
        }
    }

    #[test]
    fn zero_spread_is_exact() {
        let base = Duration::from_millis(250);
        assert_eq!(jittered(base, Duration::ZERO), base);
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_jittered_completes() {
        sleep_jittered(Duration::from_secs(2), Duration::from_secs(5)).await;
    }
}
