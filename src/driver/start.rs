use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::engine::{ProcessDefinitionId, ProcessEngine, ProcessInstanceId};

#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    Started(ProcessInstanceId),
    Failed {
        definition: ProcessDefinitionId,
        reason: String,
    },
}

/// Starts one instance. Failures are logged and returned, never retried.
pub async fn start_instance(
    engine: &dyn ProcessEngine,
    definition: &ProcessDefinitionId,
) -> StartOutcome {
    match engine.start_instance(definition).await {
        Ok(instance) => {
            debug!(%definition, instance = %instance.id, "process instance started");
            StartOutcome::Started(instance.id)
        }
        Err(e) => {
            warn!(%definition, error = %e, "process instance could not be started");
            StartOutcome::Failed {
                definition: definition.clone(),
                reason: e.to_string(),
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StartPhase {
    pub instance_ids: Vec<ProcessInstanceId>,
    pub requested: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl StartPhase {
    pub fn started(&self) -> usize {
        self.instance_ids.len()
    }
}

/// Fans out `per_definition` starts for every definition.
///
/// At most `max_concurrency` requests are in flight, capped at the
/// semaphore's permit limit. Results come back
/// through the join set, so only this task touches the collected IDs.
pub async fn start_all(
    engine: Arc<dyn ProcessEngine>,
    definitions: &[ProcessDefinitionId],
    per_definition: usize,
    max_concurrency: usize,
    progress_every: usize,
) -> StartPhase {
    let permits = Arc::new(Semaphore::new(max_concurrency.clamp(1, Semaphore::MAX_PERMITS)));
    let mut tasks = JoinSet::new();
    let started_at = Instant::now();

    for definition in definitions {
        for _ in 0..per_definition {
            let engine = Arc::clone(&engine);
            let permits = Arc::clone(&permits);
            let definition = definition.clone();
            tasks.spawn(async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return StartOutcome::Failed {
                            definition,
                            reason: "start pool closed".to_string(),
                        }
                    }
                };
                start_instance(engine.as_ref(), &definition).await
            });
        }
    }

    let mut phase = StartPhase {
        requested: tasks.len(),
        ..StartPhase::default()
    };
    let mut completed = 0usize;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(StartOutcome::Started(id)) => phase.instance_ids.push(id),
            Ok(StartOutcome::Failed { .. }) => phase.failed += 1,
            Err(e) => {
                warn!(error = %e, "start task did not complete");
                phase.failed += 1;
            }
        }

        completed += 1;
        if progress_every > 0 && completed % progress_every == 0 {
            info!(
                completed,
                requested = phase.requested,
                failed = phase.failed,
                "start progress"
            );
        }
    }

    phase.elapsed = started_at.elapsed();
    phase
}
