#![allow(clippy::unwrap_used)]
// Refresh behavior of `SyncEngine` against an in-memory listing server.

mod support;

use std::time::Duration;

use pretty_assertions::assert_eq;

use lodgely_core::{
    CoreError, EngineConfig, Listing, PendingMutation, RefreshOutcome, Resolution, SyncEngine,
};
use support::{FakeRemote, cabin, loft, setup, view};

// ── Refresh ─────────────────────────────────────────────────────────

#[tokio::test]
async fn refresh_replaces_listing_set() {
    let remote = FakeRemote::with(vec![cabin(100.0)]);
    let ctl = setup(&remote).await;
    assert_eq!(view(ctl.engine()), vec![("1".into(), 100.0)]);

    remote.set_listings(vec![cabin(120.0), loft()]);
    ctl.engine().refresh_now().await;
    assert_eq!(
        view(ctl.engine()),
        vec![("1".into(), 120.0), ("2".into(), 250.0)]
    );
}

#[tokio::test]
async fn refresh_is_idempotent() {
    let remote = FakeRemote::with(vec![cabin(100.0), loft()]);
    let engine = SyncEngine::new(remote.clone(), EngineConfig::oneshot());

    engine.refresh_now().await;
    let first: Vec<Listing> = engine.snapshot().iter().map(|l| (**l).clone()).collect();

    let mut stream = engine.subscribe();
    engine.refresh_now().await;
    let second: Vec<Listing> = engine.snapshot().iter().map(|l| (**l).clone()).collect();

    assert_eq!(first, second);
    // An unchanged collection is not re-published.
    assert!(
        tokio::time::timeout(Duration::from_millis(20), stream.changed())
            .await
            .is_err()
    );
}

#[tokio::test]
async fn failed_refresh_keeps_previous_view() {
    let remote = FakeRemote::with(vec![cabin(100.0)]);
    let ctl = setup(&remote).await;
    let refreshed_at = ctl.engine().last_refresh();

    remote.set_listings(Vec::new());
    remote.fail_next_get(CoreError::TransientFailure {
        message: "connection refused".into(),
    });

    let outcome = ctl.engine().refresh_now().await;
    assert!(matches!(outcome, RefreshOutcome::Failed { .. }));
    assert_eq!(view(ctl.engine()), vec![("1".into(), 100.0)]);
    assert_eq!(ctl.engine().last_refresh(), refreshed_at);
}

#[tokio::test]
async fn overlapping_refresh_is_not_issued() {
    let remote = FakeRemote::with(vec![cabin(100.0)]);
    let engine = SyncEngine::new(remote.clone(), EngineConfig::oneshot());

    let gate = remote.gate_next_get();
    let first = tokio::spawn({
        let engine = engine.clone();
        async move { engine.refresh_now().await }
    });
    gate.entered.notified().await;

    assert_eq!(engine.refresh_now().await, RefreshOutcome::AlreadyRunning);
    assert_eq!(remote.get_calls(), 1);

    gate.release.notify_one();
    assert_eq!(first.await.unwrap(), RefreshOutcome::Applied { listings: 1 });
}

#[tokio::test]
async fn refresh_landing_after_shutdown_is_discarded() {
    let remote = FakeRemote::with(vec![cabin(100.0)]);
    let ctl = setup(&remote).await;
    let engine = ctl.engine().clone();

    remote.set_listings(Vec::new());
    let gate = remote.gate_next_get();
    let pending = tokio::spawn({
        let engine = engine.clone();
        async move { engine.refresh_now().await }
    });
    gate.entered.notified().await;

    engine.shutdown().await;
    gate.release.notify_one();

    assert_eq!(pending.await.unwrap(), RefreshOutcome::Discarded);
    assert_eq!(view(&engine), vec![("1".into(), 100.0)]);
}

// ── Pending mutations vs. refresh ───────────────────────────────────

#[tokio::test]
async fn pending_delete_is_never_resurrected_by_refresh() {
    let remote = FakeRemote::with(vec![cabin(100.0), loft()]);
    let ctl = setup(&remote).await;
    let engine = ctl.engine();

    engine
        .register_pending_mutation(PendingMutation::delete("1".into()))
        .await
        .unwrap();
    assert_eq!(view(engine), vec![("2".into(), 250.0)]);

    // Server still reports the listing.
    assert!(engine.refresh_now().await.is_applied());
    assert_eq!(view(engine), vec![("2".into(), 250.0)]);

    engine
        .resolve_pending_mutation(&"1".into(), Resolution::Failed { reason: "boom".into() })
        .await
        .unwrap();
    assert_eq!(
        view(engine),
        vec![("1".into(), 100.0), ("2".into(), 250.0)]
    );
}

#[tokio::test]
async fn pending_edit_is_never_reverted_by_refresh() {
    let remote = FakeRemote::with(vec![cabin(100.0)]);
    let ctl = setup(&remote).await;
    let engine = ctl.engine();

    engine
        .register_pending_mutation(PendingMutation::edit(cabin(150.0)))
        .await
        .unwrap();
    engine.refresh_now().await;
    assert_eq!(view(engine), vec![("1".into(), 150.0)]);

    let pending = engine.pending_mutations().await;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].listing_id.as_str(), "1");
}

#[tokio::test]
async fn stale_refresh_cannot_undo_a_commit() {
    let remote = FakeRemote::with(vec![cabin(100.0)]);
    let ctl = setup(&remote).await;
    let engine = ctl.engine().clone();

    // Refresh fetches while the listing still exists...
    let gate = remote.gate_next_get();
    let refresh = tokio::spawn({
        let engine = engine.clone();
        async move { engine.refresh_now().await }
    });
    gate.entered.notified().await;

    // ...the delete commits...
    assert!(ctl.delete(&"1".into()).await.unwrap().is_committed());
    assert!(view(&engine).is_empty());

    // ...and the stale result lands afterwards.
    gate.release.notify_one();
    assert!(refresh.await.unwrap().is_applied());
    assert!(view(&engine).is_empty());

    engine.refresh_now().await;
    assert!(view(&engine).is_empty());
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let remote = FakeRemote::with(vec![cabin(100.0)]);
    let ctl = setup(&remote).await;

    ctl.engine()
        .register_pending_mutation(PendingMutation::delete("1".into()))
        .await
        .unwrap();
    let err = ctl
        .engine()
        .register_pending_mutation(PendingMutation::edit(cabin(1.0)))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::MutationInFlight { .. }));
}

// ── Polling ─────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn slow_refresh_skips_ticks_instead_of_overlapping() {
    let remote = FakeRemote::with(vec![cabin(100.0)]);
    let engine = SyncEngine::new(
        remote.clone(),
        EngineConfig::with_interval(Duration::from_secs(5)),
    );

    engine.start().await.unwrap();
    assert_eq!(remote.get_calls(), 1);

    let gate = remote.gate_next_get();
    tokio::time::sleep(Duration::from_millis(5_100)).await;
    gate.entered.notified().await;
    assert_eq!(remote.get_calls(), 2);

    // Several intervals pass while the poll refresh is held.
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(remote.get_calls(), 2);
    assert_eq!(engine.refresh_now().await, RefreshOutcome::AlreadyRunning);

    // Missed ticks collapse into a single catch-up refresh.
    gate.release.notify_one();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(remote.get_calls(), 3);

    engine.stop().await;
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(remote.get_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn engines_poll_independently() {
    let a = FakeRemote::with(vec![cabin(100.0)]);
    let b = FakeRemote::with(vec![loft()]);
    let fast = SyncEngine::new(a.clone(), EngineConfig::with_interval(Duration::from_secs(1)));
    let slow = SyncEngine::new(b.clone(), EngineConfig::with_interval(Duration::from_secs(10)));

    fast.start().await.unwrap();
    slow.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(10_500)).await;
    fast.stop().await;

    assert_eq!(a.get_calls(), 11);
    assert_eq!(b.get_calls(), 2);

    slow.stop().await;
}
