//! Cron-based pacing for evaluation cycles

use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchedulerError {
    #[error("scheduler disabled: interval_seconds is 0")]
    Disabled,

    #[error("invalid cron expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },
}

/// Convert an interval to a six-field cron expression
/// (second minute hour day month weekday).
///
/// Sub-minute intervals tick on seconds, sub-day intervals on minutes or
/// hours, and a day or longer once at midnight UTC. Intervals that do not
/// divide their unit evenly are rounded down to whole units.
pub fn cron_expression(interval_seconds: u64) -> Result<String, SchedulerError> {
    match interval_seconds {
        0 => Err(SchedulerError::Disabled),
        s if s < 60 => Ok(format!("*/{} * * * * *", s)),
        s if s < 3600 => Ok(format!("0 */{} * * * *", s / 60)),
        s if s < 86_400 => Ok(format!("0 0 */{} * * *", s / 3600)),
        _ => Ok("0 0 0 * * *".to_string()),
    }
}

/// Waits for the next evaluation tick.
#[derive(Debug, Clone)]
pub struct CycleScheduler {
    schedule: Schedule,
    expression: String,
    interval_seconds: u64,
}

impl CycleScheduler {
    pub fn new(interval_seconds: u64) -> Result<Self, SchedulerError> {
        let expression = cron_expression(interval_seconds)?;
        let schedule =
            Schedule::from_str(&expression).map_err(|e| SchedulerError::InvalidExpression {
                expression: expression.clone(),
                reason: e.to_string(),
            })?;

        info!(
            interval = interval_seconds,
            cron = %expression,
            "CycleScheduler: created with interval {}s (cron: {})",
            interval_seconds,
            expression
        );

        Ok(Self {
            schedule,
            expression,
            interval_seconds,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn interval_seconds(&self) -> u64 {
        self.interval_seconds
    }

    /// First tick strictly after `now`.
    pub fn next_tick_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&now).next()
    }

    /// Sleep until the next tick and return its time.
    pub async fn wait_next(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.next_tick_after(now) {
            Some(tick) => {
                let duration = (tick - now).to_std().unwrap_or_default();
                tokio::time::sleep(duration).await;
                tick
            }
            None => {
                // Schedule exhausted; fall back to the raw interval.
                let duration = std::time::Duration::from_secs(self.interval_seconds);
                tokio::time::sleep(duration).await;
                Utc::now()
            }
        }
    }
}
