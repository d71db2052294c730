#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic income system responsible for emitting periodic payout commands.

use std::time::Duration;

use castle_rooms_core::{Command, Event, INCOME_INTERVAL};

/// Configuration parameters required to construct the income system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    payout_interval: Duration,
}

impl Config {
    /// Creates a new configuration paying income once per `payout_interval`.
    #[must_use]
    pub const fn new(payout_interval: Duration) -> Self {
        Self { payout_interval }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(INCOME_INTERVAL)
    }
}

/// Pure system that converts elapsed simulation time into income payouts.
#[derive(Debug)]
pub struct Income {
    payout_interval: Duration,
    accumulator: Duration,
}

impl Income {
    /// Creates a new income system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            payout_interval: config.payout_interval,
            accumulator: Duration::ZERO,
        }
    }

    /// Consumes events and emits one payout command per elapsed interval.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        if self.payout_interval.is_zero() {
            return;
        }

        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.accumulator = self.accumulator.saturating_add(*dt);
            }
        }

        while self.accumulator >= self.payout_interval {
            self.accumulator -= self.payout_interval;
            out.push(Command::PayIncome);
        }
    }
}

impl Default for Income {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_never_pays() {
        let mut income = Income::new(Config::new(Duration::ZERO));
        let mut commands = Vec::new();
        income.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_secs(10),
            }],
            &mut commands,
        );
        assert!(commands.is_empty());
        assert_eq!(income.accumulator, Duration::ZERO);
    }
}
