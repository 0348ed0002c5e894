//! Fan-out/join task runner.

use futures::future::{join_all, BoxFuture};

use crate::error::{ScanResult, TaskErrors};

/// Drive every task to completion and aggregate every error.
///
/// All tasks of one scanner phase run concurrently; the call returns only
/// once the last one has finished (the phase's join barrier). On failure
/// the result carries the error of *every* failed task, not just the
/// first, so a caller sees the full blast radius of a failed phase.
/// Successful outputs are returned in task-submission order.
pub async fn join_tasks<'a, T>(
    tasks: Vec<BoxFuture<'a, ScanResult<T>>>,
) -> Result<Vec<T>, TaskErrors> {
    let mut outputs = Vec::with_capacity(tasks.len());
    let mut errors = Vec::new();

    for result in join_all(tasks).await {
        match result {
            Ok(output) => outputs.push(output),
            Err(err) => errors.push(err),
        }
    }

    if errors.is_empty() {
        Ok(outputs)
    } else {
        Err(TaskErrors::new(errors))
    }
}
