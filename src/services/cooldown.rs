//! Re-borrow cooldown policy

use chrono::{DateTime, Duration, Utc};
use config::ConfigError;

use crate::config::LendingConfig;

/// Longest loan or cooldown window accepted from configuration
const MAX_WINDOW_DAYS: i64 = 36_500;

/// Loan length and cooldown windows
#[derive(Debug, Clone)]
pub struct CooldownPolicy {
    borrow_duration: Duration,
    popular_cooldown: Duration,
    normal_cooldown: Duration,
}

/// A window of `days`, rejected unless it is 1 to `MAX_WINDOW_DAYS` days long
fn window(name: &str, days: Option<i64>) -> Result<Duration, ConfigError> {
    days.filter(|d| (1..=MAX_WINDOW_DAYS).contains(d))
        .and_then(Duration::try_days)
        .ok_or_else(|| {
            ConfigError::Message(format!(
                "lending.{} must be between 1 and {} days",
                name, MAX_WINDOW_DAYS
            ))
        })
}

impl CooldownPolicy {
    pub fn new(config: &LendingConfig) -> Result<Self, ConfigError> {
        let months = |count: i64| {
            (config.days_per_month > 0 && count > 0)
                .then(|| count.checked_mul(config.days_per_month))
                .flatten()
        };
        Ok(Self {
            borrow_duration: window("borrow_duration_days", Some(config.borrow_duration_days))?,
            popular_cooldown: window(
                "popular_cooldown_months",
                months(config.popular_cooldown_months),
            )?,
            normal_cooldown: window(
                "normal_cooldown_months",
                months(config.normal_cooldown_months),
            )?,
        })
    }

    /// How long a borrowed copy may be kept
    pub fn borrow_duration(&self) -> Duration {
        self.borrow_duration
    }

    fn cooldown(&self, author_popular: bool) -> Duration {
        if author_popular {
            self.popular_cooldown
        } else {
            self.normal_cooldown
        }
    }

    pub fn cooldown_days(&self, author_popular: bool) -> i64 {
        self.cooldown(author_popular).num_days()
    }

    pub fn cooldown_end_date(
        &self,
        previous_borrow_date: DateTime<Utc>,
        author_popular: bool,
    ) -> DateTime<Utc> {
        previous_borrow_date + self.cooldown(author_popular)
    }

    /// The cooldown is over strictly after its end instant
    pub fn is_elapsed(cooldown_end_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        cooldown_end_date < now
    }
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self {
            borrow_duration: Duration::days(14),
            popular_cooldown: Duration::days(180),
            normal_cooldown: Duration::days(90),
        }
    }
}
