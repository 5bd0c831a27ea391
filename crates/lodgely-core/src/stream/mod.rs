// ── Reactive listing streams ──
//
// Subscription types for consuming merged-view changes from the engine.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::Listing;

/// Snapshot of the merged listing view, in server order.
pub type ListingSnapshot = Arc<Vec<Arc<Listing>>>;

/// A subscription to the engine's merged listing view.
///
/// Provides both point-in-time snapshot access and reactive change
/// notification via `changed()` or by converting to a `Stream`.
pub struct ListingStream {
    current: ListingSnapshot,
    receiver: watch::Receiver<ListingSnapshot>,
}

impl ListingStream {
    pub(crate) fn new(receiver: watch::Receiver<ListingSnapshot>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Get the snapshot captured at creation time (or at the last `changed()`).
    pub fn current(&self) -> &ListingSnapshot {
        &self.current
    }

    /// Get the latest snapshot (may have changed since creation).
    pub fn latest(&self) -> ListingSnapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` once the engine has been dropped.
    pub async fn changed(&mut self) -> Option<ListingSnapshot> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> ListingWatchStream {
        ListingWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields the current snapshot first, then one per published change.
pub struct ListingWatchStream {
    inner: WatchStream<ListingSnapshot>,
}

impl Stream for ListingWatchStream {
    type Item = ListingSnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    fn snap(ids: &[&str]) -> ListingSnapshot {
        Arc::new(
            ids.iter()
                .map(|id| Arc::new(Listing::new(*id, "t", 1.0)))
                .collect(),
        )
    }

    #[tokio::test]
    async fn changed_tracks_latest_snapshot() {
        let (tx, rx) = watch::channel(snap(&["1"]));
        let mut stream = ListingStream::new(rx);
        assert_eq!(stream.current().len(), 1);

        tx.send_replace(snap(&["1", "2"]));
        let next = stream.changed().await.unwrap();
        assert_eq!(next.len(), 2);
        assert_eq!(stream.current().len(), 2);
    }

    #[tokio::test]
    async fn changed_returns_none_when_sender_dropped() {
        let (tx, rx) = watch::channel(snap(&[]));
        let mut stream = ListingStream::new(rx);
        drop(tx);
        assert!(stream.changed().await.is_none());
    }

    #[tokio::test]
    async fn into_stream_yields_current_then_updates() {
        let (tx, rx) = watch::channel(snap(&["1"]));
        let mut stream = ListingStream::new(rx).into_stream();

        assert_eq!(stream.next().await.unwrap().len(), 1);
        tx.send_replace(snap(&[]));
        assert!(stream.next().await.unwrap().is_empty());
    }
}
