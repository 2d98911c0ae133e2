use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use studio_booking_domain::{SyncFrame, SyncMessage};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

pub type ViewerId = u64;

/// Registry of the viewers connected to the live sync stream.
///
/// Every viewer owns an unbounded queue of frames. A viewer whose queue is closed
/// is treated as disconnected: it is removed and the remaining viewers are told
/// the new viewer count.
#[derive(Default)]
pub struct LiveSync {
    viewers: Mutex<HashMap<ViewerId, UnboundedSender<SyncFrame>>>,
    next_id: AtomicU64,
}

impl LiveSync {
    pub fn new() -> Self {
        Self::default()
    }

    fn viewers(&self) -> MutexGuard<'_, HashMap<ViewerId, UnboundedSender<SyncFrame>>> {
        self.viewers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns true if any viewer had to be dropped
    fn send_to_all(
        viewers: &mut HashMap<ViewerId, UnboundedSender<SyncFrame>>,
        frame: &SyncFrame,
    ) -> bool {
        let before = viewers.len();
        viewers.retain(|_, sender| sender.send(frame.clone()).is_ok());
        before != viewers.len()
    }

    fn deliver(viewers: &mut HashMap<ViewerId, UnboundedSender<SyncFrame>>, frame: SyncFrame) {
        let mut frame = frame;
        // Every round drops at least one viewer, so this terminates
        while Self::send_to_all(viewers, &frame) {
            debug!("Dropped disconnected viewers, {} left", viewers.len());
            frame = SyncFrame::Message(SyncMessage::viewers(viewers.len()));
        }
    }

    /// Registers a new viewer. It first receives `connected` and then, together with
    /// everybody else, the new viewer count.
    pub fn subscribe(self: &Arc<Self>) -> ViewerSubscription {
        let (sender, receiver) = unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        // The receiver is alive, this can not fail
        let _ = sender.send(SyncFrame::Message(SyncMessage::connected()));

        let mut viewers = self.viewers();
        viewers.insert(id, sender);
        let count = viewers.len();
        info!("Viewer {} connected, {} viewers", id, count);
        Self::deliver(&mut viewers, SyncFrame::Message(SyncMessage::viewers(count)));

        ViewerSubscription {
            id,
            receiver,
            hub: Arc::clone(self),
        }
    }

    /// Removes the viewer and tells the remaining ones the new count.
    /// Returns false if the viewer was already gone.
    pub fn unsubscribe(&self, id: ViewerId) -> bool {
        let mut viewers = self.viewers();
        if viewers.remove(&id).is_none() {
            return false;
        }
        let count = viewers.len();
        info!("Viewer {} disconnected, {} viewers", id, count);
        Self::deliver(&mut viewers, SyncFrame::Message(SyncMessage::viewers(count)));
        true
    }

    pub fn broadcast(&self, message: SyncMessage) {
        let mut viewers = self.viewers();
        debug!("Broadcasting {:?} to {} viewers", message.kind, viewers.len());
        Self::deliver(&mut viewers, SyncFrame::Message(message));
    }

    /// Keep-alive comment to every viewer, which also detects dead connections
    pub fn heartbeat(&self) {
        let mut viewers = self.viewers();
        Self::deliver(&mut viewers, SyncFrame::Heartbeat);
    }

    pub fn viewer_count(&self) -> usize {
        self.viewers().len()
    }

    /// Ends every open stream
    pub fn shutdown(&self) {
        let mut viewers = self.viewers();
        info!("Closing {} live sync streams", viewers.len());
        viewers.clear();
    }
}

/// A connected viewer. Dropping it unsubscribes the viewer.
pub struct ViewerSubscription {
    id: ViewerId,
    receiver: UnboundedReceiver<SyncFrame>,
    hub: Arc<LiveSync>,
}

impl ViewerSubscription {
    pub fn id(&self) -> ViewerId {
        self.id
    }

    /// Waits for the next frame. `None` means the hub closed the stream.
    pub async fn next_frame(&mut self) -> Option<SyncFrame> {
        self.receiver.recv().await
    }
}

impl Drop for ViewerSubscription {
    fn drop(&mut self) {
        self.hub.unsubscribe(self.id);
    }
}
