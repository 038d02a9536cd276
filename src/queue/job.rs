//! Job model: tiers, queued work units, and the caller's result handle.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::{DoormanError, Result};

/// Caller classification driving priority and rate-limit entitlements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Paid,
}

impl Tier {
    /// Priority weight: paid jobs always precede free jobs.
    pub(crate) fn weight(self) -> u8 {
        match self {
            Tier::Paid => 1,
            Tier::Free => 0,
        }
    }

    /// Metric label.
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Paid => "paid",
        }
    }
}

/// Boxed computation a job runs once admitted.
pub(crate) type Computation<T> = BoxFuture<'static, Result<T>>;

/// One pending unit of work.
///
/// Owned by the queue from enqueue to resolution; the caller holds only a
/// [`JobHandle`]. A job's lifecycle is queued → processing → terminal,
/// with no way back: queued jobs live in the pending map, a processing
/// job is owned by its spawned driver, and the terminal result is written
/// exactly once to `resolve`.
pub(crate) struct Job<T> {
    pub(crate) id: u64,
    pub(crate) caller_id: String,
    pub(crate) tier: Tier,
    pub(crate) computation: Computation<T>,
    pub(crate) enqueued_at: Instant,
    pub(crate) resolve: oneshot::Sender<Result<T>>,
}

pin_project_lite::pin_project! {
    /// Pending result of a submitted job.
    ///
    /// Resolves exactly once: with the computation's result, with
    /// [`DoormanError::Cancelled`] if the job was cancelled while still
    /// queued, or with [`DoormanError::QueueClosed`] if the queue was
    /// dropped first.
    pub struct JobHandle<T> {
        pub(crate) id: u64,
        #[pin]
        pub(crate) rx: oneshot::Receiver<Result<T>>,
    }
}

impl<T> JobHandle<T> {
    /// Unique id assigned to the job at enqueue time.
    pub fn job_id(&self) -> u64 {
        self.id
    }
}

impl<T> Future for JobHandle<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        match this.rx.poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(DoormanError::QueueClosed)),
            Poll::Pending => Poll::Pending,
        }
    }
}
