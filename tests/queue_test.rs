//! Tests for [`PriorityJobQueue`] — priority ordering, concurrency
//! ceiling, token gating, cancellation, wait estimation.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;

use doorman::{DoormanError, PriorityJobQueue, QueueConfig, RateLimiterConfig, Tier};

/// Queue config with a generous bucket and a ticker too slow to matter.
fn config(max_concurrent: usize, tokens: u32) -> QueueConfig {
    QueueConfig::new().max_concurrent(max_concurrent).limiter(
        RateLimiterConfig::new()
            .capacity(tokens)
            .refill_amount(0)
            .refill_interval(Duration::from_secs(3600)),
    )
}

#[tokio::test]
async fn paid_job_admitted_before_earlier_free_job() {
    let queue = PriorityJobQueue::<()>::new(config(1, 100));
    let order = Arc::new(Mutex::new(Vec::new()));

    // occupy the single slot so later submissions queue up
    let (gate_tx, gate_rx) = oneshot::channel::<()>();
    let gate = queue.submit("gate", Tier::Paid, async move {
        let _ = gate_rx.await;
        Ok(())
    });

    let o = Arc::clone(&order);
    let free = queue.submit("free-caller", Tier::Free, async move {
        o.lock().unwrap().push("free");
        Ok(())
    });
    let o = Arc::clone(&order);
    let paid = queue.submit("paid-caller", Tier::Paid, async move {
        o.lock().unwrap().push("paid");
        Ok(())
    });
    assert_eq!(queue.stats().queued_jobs, 2);

    gate_tx.send(()).expect("gate job is waiting");
    gate.await.expect("gate job succeeds");
    paid.await.expect("paid job succeeds");
    free.await.expect("free job succeeds");

    assert_eq!(*order.lock().unwrap(), vec!["paid", "free"]);
}

#[tokio::test]
async fn same_tier_jobs_run_in_enqueue_order() {
    let queue = PriorityJobQueue::<()>::new(config(1, 100));
    let order = Arc::new(Mutex::new(Vec::new()));

    let (gate_tx, gate_rx) = oneshot::channel::<()>();
    let gate = queue.submit("gate", Tier::Free, async move {
        let _ = gate_rx.await;
        Ok(())
    });

    let o = Arc::clone(&order);
    let first = queue.submit("first", Tier::Free, async move {
        o.lock().unwrap().push("first");
        Ok(())
    });
    let o = Arc::clone(&order);
    let second = queue.submit("second", Tier::Free, async move {
        o.lock().unwrap().push("second");
        Ok(())
    });

    gate_tx.send(()).expect("gate job is waiting");
    gate.await.expect("gate job succeeds");
    first.await.expect("first job succeeds");
    second.await.expect("second job succeeds");

    assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
}

#[tokio::test]
async fn processing_never_exceeds_concurrency_ceiling() {
    let queue = PriorityJobQueue::<()>::new(config(3, 100));
    let mut gates = Vec::new();
    let mut handles = Vec::new();

    for i in 0..6 {
        let (tx, rx) = oneshot::channel::<()>();
        gates.push(tx);
        handles.push(queue.submit(format!("caller-{i}"), Tier::Paid, async move {
            let _ = rx.await;
            Ok(())
        }));
    }

    let stats = queue.stats();
    assert_eq!(stats.processing_jobs, 3);
    assert_eq!(stats.queued_jobs, 3);

    for gate in gates {
        let _ = gate.send(());
    }
    for handle in handles {
        handle.await.expect("job succeeds");
    }

    let stats = queue.stats();
    assert_eq!(stats.processing_jobs, 0);
    assert_eq!(stats.queued_jobs, 0);
    assert_eq!(stats.completed_jobs, 6);
}

#[tokio::test]
async fn admission_stops_when_bucket_is_empty() {
    let queue = PriorityJobQueue::<u32>::new(config(10, 2));

    let first = queue.submit("a", Tier::Paid, async { Ok(1) });
    let second = queue.submit("a", Tier::Paid, async { Ok(2) });
    let third = queue.submit("a", Tier::Paid, async { Ok(3) });

    assert_eq!(first.await.expect("token available"), 1);
    assert_eq!(second.await.expect("token available"), 2);

    // two tokens spent, none left: the third job stays queued even though
    // slots are free
    assert_eq!(queue.stats().queued_jobs, 1);
    assert_eq!(queue.limiter().available(), 0);
    assert_eq!(queue.position("a"), 1);
    drop(third);
}

#[tokio::test(start_paused = true)]
async fn refill_tick_resumes_admission() {
    let queue = PriorityJobQueue::<u32>::new(
        QueueConfig::new().max_concurrent(10).limiter(
            RateLimiterConfig::new()
                .capacity(1)
                .refill_amount(1)
                .refill_interval(Duration::from_secs(1)),
        ),
    );

    let first = queue.submit("a", Tier::Paid, async { Ok(1) });
    let second = queue.submit("a", Tier::Paid, async { Ok(2) });

    assert_eq!(first.await.expect("token available"), 1);
    assert_eq!(queue.stats().queued_jobs, 1);

    // paused clock: awaiting the second handle auto-advances to the next
    // refill tick, which tops up the bucket and re-runs admission
    assert_eq!(second.await.expect("admitted after refill"), 2);
}

#[tokio::test]
async fn cancel_removes_only_queued_jobs() {
    let queue = PriorityJobQueue::<()>::new(config(1, 100));

    let (gate_tx, gate_rx) = oneshot::channel::<()>();
    let gate = queue.submit("worker", Tier::Paid, async move {
        let _ = gate_rx.await;
        Ok(())
    });

    let mut alice_handles = Vec::new();
    for _ in 0..3 {
        alice_handles.push(queue.submit("alice", Tier::Free, async { Ok(()) }));
    }
    let bob = queue.submit("bob", Tier::Free, async { Ok(()) });

    assert_eq!(queue.cancel("alice"), 3);
    for handle in alice_handles {
        assert!(matches!(handle.await, Err(DoormanError::Cancelled)));
    }

    // the in-flight job is not cancellable
    assert_eq!(queue.cancel("worker"), 0);
    assert_eq!(queue.position("bob"), 1);

    gate_tx.send(()).expect("gate job is waiting");
    gate.await.expect("gate job succeeds");
    bob.await.expect("bob's job survives the cancellation");
}

#[tokio::test]
async fn position_ranks_by_priority_then_arrival() {
    // empty bucket: nothing gets admitted, everything stays queued
    let queue = PriorityJobQueue::<()>::new(config(3, 0));

    let _free = queue.submit("free-caller", Tier::Free, async { Ok(()) });
    let _paid = queue.submit("paid-caller", Tier::Paid, async { Ok(()) });

    assert_eq!(queue.position("paid-caller"), 1);
    assert_eq!(queue.position("free-caller"), 2);
    assert_eq!(queue.position("stranger"), 0);
}

#[tokio::test]
async fn wait_estimate_scales_with_rank_and_fallback_average() {
    let queue = PriorityJobQueue::<()>::new(
        QueueConfig::new()
            .max_concurrent(3)
            .fallback_processing_estimate(Duration::from_millis(6000))
            .limiter(
                RateLimiterConfig::new()
                    .capacity(0)
                    .refill_amount(0)
                    .refill_interval(Duration::from_secs(3600)),
            ),
    );

    let mut handles = Vec::new();
    for i in 0..6 {
        handles.push(queue.submit(format!("caller-{i}"), Tier::Free, async { Ok(()) }));
    }

    // rank 6, ceiling 3, 6000ms fallback: ceil((6/3) * 6) = 12 seconds
    assert_eq!(queue.estimated_wait_seconds("caller-5"), 12);
    // rank 1: ceil((1/3) * 6) = 2 seconds
    assert_eq!(queue.estimated_wait_seconds("caller-0"), 2);
    assert_eq!(queue.estimated_wait_seconds("stranger"), 0);
}

#[tokio::test]
async fn failed_computation_propagates_and_is_counted() {
    let queue = PriorityJobQueue::<()>::new(config(3, 100));

    let handle = queue.submit("a", Tier::Free, async {
        Err(DoormanError::InvalidInput("bad address".to_string()))
    });
    assert!(matches!(handle.await, Err(DoormanError::InvalidInput(_))));

    let stats = queue.stats();
    assert_eq!(stats.failed_jobs, 1);
    assert_eq!(stats.completed_jobs, 0);
}

#[tokio::test]
async fn job_ids_are_unique() {
    let queue = PriorityJobQueue::<()>::new(config(3, 100));
    let a = queue.submit("a", Tier::Free, async { Ok(()) });
    let b = queue.submit("a", Tier::Free, async { Ok(()) });
    assert_ne!(a.job_id(), b.job_id());
    a.await.expect("job succeeds");
    b.await.expect("job succeeds");
}

#[tokio::test]
async fn dropping_queue_resolves_outstanding_handles_as_closed() {
    let queue = PriorityJobQueue::<()>::new(config(3, 0));
    let handle = queue.submit("a", Tier::Free, async { Ok(()) });
    drop(queue);
    assert!(matches!(handle.await, Err(DoormanError::QueueClosed)));
}

#[tokio::test]
async fn completion_backfills_the_freed_slot() {
    let queue = PriorityJobQueue::<()>::new(config(1, 100));

    let (gate_tx, gate_rx) = oneshot::channel::<()>();
    let gate = queue.submit("gate", Tier::Paid, async move {
        let _ = gate_rx.await;
        Ok(())
    });
    let queued = queue.submit("next", Tier::Free, async { Ok(()) });
    assert_eq!(queue.stats().queued_jobs, 1);

    // completing the gate job admits the queued one without any timer
    gate_tx.send(()).expect("gate job is waiting");
    gate.await.expect("gate job succeeds");
    queued.await.expect("backfilled job succeeds");
    assert_eq!(queue.stats().completed_jobs, 2);
}
