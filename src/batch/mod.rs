//! Concurrent batch execution.
//!
//! Some commands fan one invocation out into N independent remote calls
//! (`server create a b c`). Jobs run concurrently with join semantics: the
//! invoking flow resumes only after every job has completed, a failing job
//! never cancels its siblings, and each job performs its own display on
//! success. Every outcome is kept, so a caller reporting failure can name
//! all of them instead of a non-deterministically chosen one.

use crate::error::{CliError, CliResult};
use futures_util::future::join_all;
use std::future::Future;

/// Outcomes of a fanned-out batch, one entry per job in input order.
#[derive(Debug)]
pub struct BatchReport {
    outcomes: Vec<CliResult<()>>,
}

impl BatchReport {
    /// Number of jobs that ran.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Errors of the jobs that failed.
    pub fn failures(&self) -> Vec<&CliError> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err()).collect()
    }

    /// Collapse the report: `Ok` when every job succeeded, otherwise a
    /// single error carrying the failure count and every message. A
    /// one-job batch reports its error as-is.
    pub fn into_result(mut self) -> CliResult<()> {
        let total = self.outcomes.len();
        let mut failures: Vec<CliError> =
            self.outcomes.drain(..).filter_map(|o| o.err()).collect();
        if failures.is_empty() {
            return Ok(());
        }
        if total == 1 {
            return Err(failures.remove(0));
        }

        let detail = failures
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Err(CliError::Batch { failed: failures.len(), total, detail })
    }
}

/// Run `op` once per input, all jobs concurrently, and join.
///
/// There is no ordering guarantee between jobs and no timeout here; hung
/// remote calls are the HTTP transport's concern.
pub async fn run_batch<I, F, Fut>(inputs: Vec<I>, op: F) -> BatchReport
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = CliResult<()>>,
{
    let jobs: Vec<Fut> = inputs.into_iter().map(op).collect();
    BatchReport { outcomes: join_all(jobs).await }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_failing_job_does_not_stop_siblings() {
        let renders: Vec<AtomicUsize> = (0..5).map(|_| AtomicUsize::new(0)).collect();

        let report = run_batch((0..5).collect(), |i: usize| {
            let renders = &renders;
            async move {
                if i == 2 {
                    return Err(CliError::InvalidArgument(format!("job {} failed", i)));
                }
                renders[i].fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await;

        assert_eq!(report.total(), 5);
        assert_eq!(report.failures().len(), 1);

        for (i, r) in renders.iter().enumerate() {
            let expected = if i == 2 { 0 } else { 1 };
            assert_eq!(r.load(Ordering::SeqCst), expected, "job {}", i);
        }

        let err = report.into_result().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("1 of 5"));
        assert!(msg.contains("job 2 failed"));
    }

    #[tokio::test]
    async fn test_all_failures_are_reported() {
        let report = run_batch(vec!["a", "b"], |name: &str| async move {
            Err(CliError::InvalidArgument(format!("{} rejected", name)))
        })
        .await;

        let err = report.into_result().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("2 of 2"));
        assert!(msg.contains("a rejected"));
        assert!(msg.contains("b rejected"));
    }

    #[tokio::test]
    async fn test_single_job_error_is_not_wrapped() {
        let report = run_batch(vec!["only"], |name: &str| async move {
            Err(CliError::InvalidArgument(format!("{} rejected", name)))
        })
        .await;

        let err = report.into_result().unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
        assert_eq!(err.to_string(), "invalid argument: only rejected");
    }

    #[tokio::test]
    async fn test_empty_batch_succeeds() {
        let report = run_batch(Vec::<usize>::new(), |_| async { Ok(()) }).await;
        assert_eq!(report.total(), 0);
        assert!(report.into_result().is_ok());
    }
}
