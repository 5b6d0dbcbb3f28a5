use chrono::{DateTime, FixedOffset, NaiveDateTime};
use thiserror::Error;
use tracing::{debug, warn};

use crate::engine::{ProcessEngine, ProcessInstanceId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimestampError {
    #[error("invalid timestamp {0:?}")]
    Invalid(String),
}

/// Parses an engine timestamp.
///
/// Accepts RFC 3339 (`2020-01-01T00:00:10Z`), the engine default
/// `2020-01-01T00:00:10.000+0000`, and offset-less values, which are UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, TimestampError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts);
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(ts);
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc().fixed_offset())
        .map_err(|_| TimestampError::Invalid(raw.to_string()))
}

/// Seconds between two engine timestamps, with microsecond resolution.
pub fn cycle_time_seconds(start: &str, end: &str) -> Result<f64, TimestampError> {
    let delta = parse_timestamp(end)? - parse_timestamp(start)?;
    Ok(match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1_000.0,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryOutcome {
    Completed {
        instance: ProcessInstanceId,
        seconds: f64,
    },
    /// The engine has no `endTime` yet.
    Unfinished(ProcessInstanceId),
    Failed {
        instance: ProcessInstanceId,
        reason: String,
    },
}

/// Reads one instance's history and turns it into a cycle time.
pub async fn get_history(engine: &dyn ProcessEngine, instance: &ProcessInstanceId) -> HistoryOutcome {
    let hist = match engine.instance_history(instance).await {
        Ok(hist) => hist,
        Err(e) => {
            warn!(%instance, error = %e, "process instance history could not be retrieved");
            return HistoryOutcome::Failed {
                instance: instance.clone(),
                reason: e.to_string(),
            };
        }
    };

    let Some(end_time) = hist.end_time.as_deref() else {
        warn!(%instance, state = ?hist.state, "process instance has not finished");
        return HistoryOutcome::Unfinished(instance.clone());
    };

    match cycle_time_seconds(&hist.start_time, end_time) {
        Ok(seconds) => {
            debug!(%instance, seconds, "cycle time");
            HistoryOutcome::Completed {
                instance: instance.clone(),
                seconds,
            }
        }
        Err(e) => {
            warn!(%instance, error = %e, "process instance history could not be parsed");
            HistoryOutcome::Failed {
                instance: instance.clone(),
                reason: e.to_string(),
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryPhase {
    pub durations: Vec<f64>,
    pub attempted: usize,
    pub failed: usize,
    pub unfinished: usize,
}

/// Reads history sequentially, `repeats` times per instance.
pub async fn fetch_all(
    engine: &dyn ProcessEngine,
    instances: &[ProcessInstanceId],
    repeats: usize,
) -> HistoryPhase {
    let mut phase = HistoryPhase::default();
    for instance in instances {
        for _ in 0..repeats {
            phase.attempted += 1;
            match get_history(engine, instance).await {
                HistoryOutcome::Completed { seconds, .. } => phase.durations.push(seconds),
                HistoryOutcome::Unfinished(_) => phase.unfinished += 1,
                HistoryOutcome::Failed { .. } => phase.failed += 1,
            }
        }
    }
    phase
}
