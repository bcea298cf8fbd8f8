use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use keepsake::phase::{
    AnchoredClock, Evaluation, PhaseScheduler, PhaseTarget, PhaseTargets, SchedulerState,
};
use tokio::sync::mpsc;
use tokio_test::{assert_pending, assert_ready};

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

fn targets() -> Arc<PhaseTargets> {
    Arc::new(
        PhaseTargets::new(
            "BEFORE",
            vec![
                PhaseTarget::new("first", "DURING", at(1_000)),
                PhaseTarget::new("second", "AFTER", at(1_002)),
            ],
        )
        .unwrap(),
    )
}

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

fn channel_scheduler(
    start: DateTime<Utc>,
) -> (PhaseScheduler, mpsc::UnboundedReceiver<Evaluation>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut scheduler = PhaseScheduler::new(
        targets(),
        Arc::new(AnchoredClock::starting_at(start)),
    );
    assert!(scheduler.start(move |evaluation| {
        let _ = tx.send(*evaluation);
    }));
    (scheduler, rx)
}

#[tokio::test(start_paused = true)]
async fn nothing_arrives_between_ticks() {
    let (_scheduler, mut rx) = channel_scheduler(at(998));
    assert_eq!(rx.try_recv().unwrap().breakdown.seconds, 2);

    let mut next = tokio_test::task::spawn(rx.recv());
    assert_pending!(next.poll());

    tokio::time::advance(Duration::from_millis(500)).await;
    settle().await;
    assert_pending!(next.poll());

    tokio::time::advance(Duration::from_millis(500)).await;
    settle().await;
    assert!(next.is_woken());
    let evaluation = assert_ready!(next.poll()).unwrap();
    assert_eq!(evaluation.breakdown.seconds, 1);
}

#[tokio::test(start_paused = true)]
async fn channel_closes_after_stop() {
    let (mut scheduler, mut rx) = channel_scheduler(at(998));
    let _ = rx.try_recv();

    scheduler.stop();
    assert_eq!(scheduler.state(), SchedulerState::Idle);
    settle().await;

    tokio::time::advance(Duration::from_secs(5)).await;
    settle().await;
    // the observer (and its sender) is gone
    assert_eq!(rx.recv().await, None);
}

#[tokio::test(start_paused = true)]
async fn full_run_publishes_each_change_once() {
    let (_scheduler, mut rx) = channel_scheduler(at(999));

    let mut seen = Vec::new();
    for _ in 0..5 {
        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
    }
    while let Ok(evaluation) = rx.try_recv() {
        seen.push((evaluation.phase.index(), evaluation.breakdown.total_seconds()));
    }
    assert_eq!(seen, [(0, 1), (1, 2), (1, 1), (2, 0)]);
}
