//! Task completion span helpers.

use tracing::Span;

use crate::model::task::TaskId;
use crate::model::user::UserId;

/// Start a span covering one completion request.
///
/// `task.state` is declared empty and filled by [`record_transition`].
pub fn start_completion_span(owner: UserId, task: TaskId) -> Span {
    tracing::info_span!(
        "task.complete",
        "task.id" = %task,
        "task.owner" = %owner,
        "task.state" = tracing::field::Empty,
    )
}

/// Record a lifecycle transition on the span and emit an event for it.
pub fn record_transition(span: &Span, from: &str, to: &str) {
    span.record("task.state", to);
    span.in_scope(|| {
        tracing::info!(from = from, to = to, "state_transition");
    });
}
