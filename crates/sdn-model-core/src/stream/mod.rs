// ── Reactive model streams ──
//
// Subscriptions handed out by the ModelStore: per-collection snapshot
// streams, optionally narrowed by an entity filter, and the stream of
// model events.

mod filter;

pub use filter::{DeviceFilter, EntityFilter, HostFilter, LinkFilter, PortFilter};

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use futures_core::Stream;
use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::{BroadcastStream, WatchStream};
use tracing::warn;

use crate::store::ModelEvent;

type Snapshot<T> = Arc<Vec<Arc<T>>>;
type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Narrow `snapshot` to the entities `filter` accepts.
fn apply<T>(filter: Option<&Predicate<T>>, snapshot: &Snapshot<T>) -> Snapshot<T> {
    match filter {
        None => Arc::clone(snapshot),
        Some(keep) => Arc::new(
            snapshot
                .iter()
                .filter(|entity| keep(entity.as_ref()))
                .cloned()
                .collect(),
        ),
    }
}

/// Same entity snapshots, in the same order.
fn same_view<T>(a: &Snapshot<T>, b: &Snapshot<T>) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| Arc::ptr_eq(x, y))
}

// ── Entity snapshots ────────────────────────────────────────────────

/// A subscription to one entity collection of the model.
///
/// Every view is an immutable snapshot: readers see a collection either
/// before or after a store mutation, never halfway through one. A
/// filtered stream only reports changes that alter its own view.
pub struct EntityStream<T: Send + Sync + 'static> {
    current: Snapshot<T>,
    receiver: watch::Receiver<Snapshot<T>>,
    filter: Option<Predicate<T>>,
}

impl<T: Send + Sync + 'static> EntityStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<Snapshot<T>>) -> Self {
        let current = receiver.borrow().clone();
        Self {
            current,
            receiver,
            filter: None,
        }
    }

    /// Keep only entities accepted by `filter`. Filters stack: each call
    /// narrows the view further.
    pub fn filtered(mut self, filter: impl EntityFilter<T> + 'static) -> Self {
        let earlier = self.filter.take();
        let keep: Predicate<T> = Arc::new(move |entity: &T| {
            earlier.as_ref().is_none_or(|keep| keep(entity)) && filter.matches(entity)
        });
        self.current = apply(Some(&keep), &self.current);
        self.filter = Some(keep);
        self
    }

    /// The view captured at subscription time or at the last `changed()`.
    pub fn current(&self) -> &Snapshot<T> {
        &self.current
    }

    /// The view as of now, which may be newer than `current()`.
    pub fn latest(&self) -> Snapshot<T> {
        let snapshot = self.receiver.borrow().clone();
        apply(self.filter.as_ref(), &snapshot)
    }

    /// Wait until the view changes and return it. `None` once the store
    /// has been dropped.
    pub async fn changed(&mut self) -> Option<Snapshot<T>> {
        loop {
            self.receiver.changed().await.ok()?;
            let snapshot = self.receiver.borrow_and_update().clone();
            let view = apply(self.filter.as_ref(), &snapshot);
            if self.filter.is_none() || !same_view(&view, &self.current) {
                self.current = Arc::clone(&view);
                return Some(view);
            }
        }
    }

    /// Convert into a `Stream` of views for use with `StreamExt`.
    pub fn into_stream(self) -> EntityWatchStream<T> {
        EntityWatchStream {
            inner: WatchStream::new(self.receiver),
            filter: self.filter,
        }
    }
}

/// `Stream` of entity views: the view at conversion time first, then one
/// per store mutation of the collection.
pub struct EntityWatchStream<T: Send + Sync + 'static> {
    inner: WatchStream<Snapshot<T>>,
    filter: Option<Predicate<T>>,
}

impl<T: Send + Sync + 'static> Stream for EntityWatchStream<T> {
    type Item = Snapshot<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let next = ready!(Pin::new(&mut self.inner).poll_next(cx));
        Poll::Ready(next.map(|snapshot| apply(self.filter.as_ref(), &snapshot)))
    }
}

// ── Model events ────────────────────────────────────────────────────

/// `Stream` of [`ModelEvent`]s produced after subscription.
///
/// A subscriber that falls more than the channel capacity behind skips
/// the events it missed; the gap is logged.
pub struct EventStream {
    inner: BroadcastStream<ModelEvent>,
}

impl EventStream {
    pub(crate) fn new(receiver: broadcast::Receiver<ModelEvent>) -> Self {
        Self {
            inner: BroadcastStream::new(receiver),
        }
    }
}

impl Stream for EventStream {
    type Item = ModelEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match ready!(Pin::new(&mut self.inner).poll_next(cx)) {
                Some(Ok(event)) => return Poll::Ready(Some(event)),
                Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                    warn!(skipped, "model event subscriber lagged");
                }
                None => return Poll::Ready(None),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio_test::{assert_pending, assert_ready, task};

    use super::*;
    use crate::model::{Annotations, Device, DeviceId, DeviceInfo, ProviderId};

    fn channel() -> (watch::Sender<Snapshot<u32>>, watch::Receiver<Snapshot<u32>>) {
        watch::channel(Arc::new(Vec::new()))
    }

    fn snapshot(values: &[u32]) -> Snapshot<u32> {
        Arc::new(values.iter().copied().map(Arc::new).collect())
    }

    #[test]
    fn changed_waits_for_a_new_snapshot() {
        let (tx, rx) = channel();
        let mut entities = EntityStream::new(rx);
        {
            let mut changed = task::spawn(entities.changed());
            assert_pending!(changed.poll());

            tx.send_replace(snapshot(&[7]));
            assert!(changed.is_woken());
            let view = assert_ready!(changed.poll()).unwrap();
            assert_eq!(*view[0], 7);
        }
        assert_eq!(entities.current().len(), 1);
    }

    #[test]
    fn changed_ends_when_the_sender_is_dropped() {
        let (tx, rx) = channel();
        let mut entities = EntityStream::new(rx);
        drop(tx);
        let mut changed = task::spawn(entities.changed());
        assert!(assert_ready!(changed.poll()).is_none());
    }

    #[test]
    fn filtered_view_skips_changes_outside_the_filter() {
        let (tx, rx) = channel();
        let even = snapshot(&[2]);
        tx.send_replace(Arc::clone(&even));
        let mut entities = EntityStream::new(rx).filtered(|v: &u32| v % 2 == 0);
        assert_eq!(entities.current().len(), 1);

        let mut changed = task::spawn(entities.changed());
        // Only an odd entity arrives; the even view is untouched.
        tx.send_replace(Arc::new(vec![Arc::clone(&even[0]), Arc::new(3)]));
        assert_pending!(changed.poll());

        tx.send_replace(Arc::new(vec![Arc::clone(&even[0]), Arc::new(4)]));
        let view = assert_ready!(changed.poll()).unwrap();
        assert_eq!(view.iter().map(|v| **v).collect::<Vec<_>>(), vec![2, 4]);
    }

    #[test]
    fn filters_stack() {
        let (tx, rx) = channel();
        tx.send_replace(snapshot(&[1, 2, 3, 4, 6, 12]));
        let entities = EntityStream::new(rx)
            .filtered(|v: &u32| v % 2 == 0)
            .filtered(|v: &u32| v % 3 == 0);
        assert_eq!(entities.latest().len(), 2);
    }

    #[test]
    fn watch_stream_yields_initial_then_filtered_updates() {
        let (tx, rx) = channel();
        let mut stream = task::spawn(EntityStream::new(rx).filtered(|v: &u32| *v > 1).into_stream());

        let initial = assert_ready!(stream.poll_next()).unwrap();
        assert!(initial.is_empty());
        assert_pending!(stream.poll_next());

        tx.send_replace(snapshot(&[1, 2, 3]));
        let next = assert_ready!(stream.poll_next()).unwrap();
        assert_eq!(next.len(), 2);
    }

    #[test]
    fn event_stream_skips_lagged_gap() {
        let (tx, rx) = broadcast::channel(1);
        let mut events = task::spawn(EventStream::new(rx));
        let device = |sw: &str| {
            Arc::new(Device::new(
                ProviderId::NONE,
                DeviceId::NONE,
                DeviceInfo {
                    sw_version: sw.into(),
                    ..DeviceInfo::default()
                },
                Annotations::empty(),
            ))
        };

        tx.send(ModelEvent::DeviceAdded(device("1"))).unwrap();
        tx.send(ModelEvent::DeviceUpdated(device("2"))).unwrap();

        // The first event was overwritten; the stream resumes at the second.
        let event = assert_ready!(events.poll_next()).unwrap();
        assert_eq!(event.kind(), "device-updated");
        assert_pending!(events.poll_next());

        drop(tx);
        assert!(assert_ready!(events.poll_next()).is_none());
    }
}
