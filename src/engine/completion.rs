//! Task completion state machine.
//!
//! `NotStarted -> InProgress(stage) -> ... -> InProgress(last) -> Completed`.
//! Each completion advances exactly one step; `Completed` is terminal.

use chrono::{DateTime, Days, Utc};
use serde::Serialize;

use super::schedule::next_stage;
use crate::error::{Error, Result};
use crate::model::repetition::RepetitionType;
use crate::model::task::{Progress, Task, TaskId};
use crate::model::user::UserId;
use crate::store::{ScheduleProvider, TaskStore};

/// What a completion did to the task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Completion {
    /// The task entered `stage` and is due again at `begin`.
    Advanced {
        stage: RepetitionType,
        begin: DateTime<Utc>,
    },
    /// No stage was left; the task is done for good.
    Finished { at: DateTime<Utc> },
}

impl Completion {
    pub fn label(&self) -> &'static str {
        match self {
            Completion::Advanced { .. } => "advanced",
            Completion::Finished { .. } => "finished",
        }
    }
}

/// A computed, not yet persisted, transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Progress as observed when the transition was computed.
    pub previous: Progress,
    pub next: Progress,
    pub completion: Completion,
}

/// Compute the next lifecycle point of an owned task.
///
/// Performs no writes. Fails with `AlreadyCompleted` on a terminal task and
/// with `DataIntegrity` when the task points at a stage the catalog no longer
/// has.
pub async fn complete(
    schedule: &dyn ScheduleProvider,
    task: &Task,
    now: DateTime<Utc>,
) -> Result<Transition> {
    if task.is_completed() {
        return Err(Error::AlreadyCompleted(task.id));
    }
    let previous = task.progress();

    let upcoming = match next_stage(schedule, previous.repetition_type).await {
        Ok(stage) => stage,
        Err(Error::NotFound(what)) => {
            return Err(Error::DataIntegrity(format!(
                "task {} references missing {what}",
                task.id
            )));
        }
        Err(e) => return Err(e),
    };

    let (next, completion) = match upcoming {
        None => (
            Progress {
                completed_at: Some(now),
                ..previous
            },
            Completion::Finished { at: now },
        ),
        Some(stage) => {
            let begin = add_days(now, stage.day)?;
            (
                Progress {
                    repetition_type: Some(stage.id),
                    repetition_begin: Some(begin),
                    completed_at: None,
                },
                Completion::Advanced { stage, begin },
            )
        }
    };

    Ok(Transition {
        previous,
        next,
        completion,
    })
}

/// Fetch, transition, and conditionally persist a task for `owner`.
///
/// The write only lands if the stored progress still matches what was read,
/// so two racing completions cannot both advance the task. The loser gets
/// `Conflict`; retrying is the caller's decision.
pub async fn complete_task(
    schedule: &dyn ScheduleProvider,
    tasks: &dyn TaskStore,
    owner: UserId,
    id: TaskId,
    now: DateTime<Utc>,
) -> Result<(Task, Completion)> {
    let task = tasks.find_task(owner, id).await?;
    let transition = complete(schedule, &task, now).await?;
    let updated = tasks
        .update_progress(owner, id, &transition.previous, &transition.next)
        .await?;
    Ok((updated, transition.completion))
}

/// Calendar-day arithmetic: Jan 30 + 3 days is Feb 2, whatever the month length.
fn add_days(now: DateTime<Utc>, days: i32) -> Result<DateTime<Utc>> {
    let days = u64::try_from(days)
        .map_err(|_| Error::DataIntegrity(format!("negative stage interval: {days} days")))?;
    now.checked_add_days(Days::new(days))
        .ok_or_else(|| Error::DataIntegrity(format!("stage interval of {days} days overflows")))
}
