use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const SERVER_ERROR_BELOW: f64 = 0.10;
pub const CLIENT_ERROR_BELOW: f64 = 0.20;

/// Simulated result class of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    ClientError,
    ServerError,
}

impl Outcome {
    pub fn status_code(self) -> u16 {
        match self {
            Self::Success => 200,
            Self::ClientError => 400,
            Self::ServerError => 500,
        }
    }
}

/// Maps a uniform draw in `[0, 1)` onto an outcome: 10% server error,
/// 10% client error, 80% success.
pub fn classify(roll: f64) -> Outcome {
    if roll < SERVER_ERROR_BELOW {
        Outcome::ServerError
    } else if roll < CLIENT_ERROR_BELOW {
        Outcome::ClientError
    } else {
        Outcome::Success
    }
}

/// Source of the two random draws a handler makes.
pub trait OutcomeSource: Send + Sync {
    fn latency(&self) -> Duration;

    /// Uniform value in `[0, 1)` fed to [`classify`].
    fn roll(&self) -> f64;
}

#[derive(Debug, Clone)]
pub struct RandomOutcomes {
    min: Duration,
    max: Duration,
}

impl RandomOutcomes {
    /// `min` must be below `max`; `Config::validate` enforces this for
    /// configured bounds.
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }
}

impl Default for RandomOutcomes {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_millis(2000))
    }
}

impl OutcomeSource for RandomOutcomes {
    fn latency(&self) -> Duration {
        if self.min >= self.max {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..self.max)
    }

    fn roll(&self) -> f64 {
        rand::thread_rng().gen_range(0.0..1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_thresholds() {
        assert_eq!(classify(0.0), Outcome::ServerError);
        assert_eq!(classify(0.099), Outcome::ServerError);
        assert_eq!(classify(0.10), Outcome::ClientError);
        assert_eq!(classify(0.199), Outcome::ClientError);
        assert_eq!(classify(0.20), Outcome::Success);
        assert_eq!(classify(0.999), Outcome::Success);
    }

    #[test]
    fn status_codes() {
        assert_eq!(Outcome::Success.status_code(), 200);
        assert_eq!(Outcome::ClientError.status_code(), 400);
        assert_eq!(Outcome::ServerError.status_code(), 500);
    }

    #[test]
    fn random_draws_stay_in_range() {
        let source = RandomOutcomes::default();
        for _ in 0..1_000 {
            let latency = source.latency();
            assert!(latency >= Duration::from_millis(100));
            assert!(latency < Duration::from_millis(2000));

            let roll = source.roll();
            assert!((0.0..1.0).contains(&roll));
        }
    }

    #[test]
    fn degenerate_range_returns_min() {
        let source = RandomOutcomes::new(Duration::from_millis(5), Duration::from_millis(5));
        assert_eq!(source.latency(), Duration::from_millis(5));
    }
}
