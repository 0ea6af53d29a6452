//! Scan notifications and the bus that fans them out.
//!
//! Events are fire-and-forget. Listeners run on whichever thread emitted the
//! event (the scan worker or a resolution thread), outside any pipeline lock.
//! A listener that panics is logged and skipped; the emitter carries on.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};

use tvshelf_catalog::types::MatchedShow;

use crate::error::panic_message;
use crate::job::ScanStats;

/// Stage of a running job, reported through [`ScanEvent::JobProgress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Initializing,
    Scanning,
    Searching,
    Downloading,
    Storing,
    CachingPosters,
    Matching,
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStage::Initializing => "Initializing",
            JobStage::Scanning => "Scanning",
            JobStage::Searching => "Searching",
            JobStage::Downloading => "Downloading",
            JobStage::Storing => "Storing",
            JobStage::CachingPosters => "Caching posters",
            JobStage::Matching => "Matching",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    JobStarted {
        folder: PathBuf,
    },
    JobProgress {
        folder: PathBuf,
        stage: JobStage,
        details: String,
    },
    /// `show` is `None` when the folder was skipped or nothing matched.
    JobCompleted {
        folder: PathBuf,
        show: Option<MatchedShow>,
    },
    JobError {
        folder: PathBuf,
        message: String,
    },
    JobUncertain {
        folder: PathBuf,
        candidates: Vec<MatchedShow>,
    },
    /// The worker ran out of jobs. Not sent when it was stopped early.
    AllJobsComplete,
    ScanStats(ScanStats),
}

impl ScanEvent {
    /// The folder this event concerns, if any.
    pub fn folder(&self) -> Option<&PathBuf> {
        match self {
            ScanEvent::JobStarted { folder }
            | ScanEvent::JobProgress { folder, .. }
            | ScanEvent::JobCompleted { folder, .. }
            | ScanEvent::JobError { folder, .. }
            | ScanEvent::JobUncertain { folder, .. } => Some(folder),
            ScanEvent::AllJobsComplete | ScanEvent::ScanStats(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&ScanEvent) + Send + Sync>;

/// Observer registry for [`ScanEvent`]s.
#[derive(Default)]
pub struct EventBus {
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.lock().len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Listener)>> {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a listener. It stays registered until [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ScanEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Arc::new(listener)));
        id
    }

    /// Forward every event into a channel. Sends after the receiver is
    /// dropped are ignored; unsubscribe to stop forwarding.
    pub fn subscribe_channel(&self) -> (SubscriptionId, mpsc::Receiver<ScanEvent>) {
        let (tx, rx) = mpsc::channel();
        let id = self.subscribe(move |event| {
            let _ = tx.send(event.clone());
        });
        (id, rx)
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    pub fn emit(&self, event: ScanEvent) {
        let snapshot: Vec<(SubscriptionId, Listener)> = self.lock().clone();
        for (id, listener) in snapshot {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener(&event)));
            if let Err(payload) = outcome {
                log::warn!(
                    "Event listener {:?} panicked: {}",
                    id,
                    panic_message(payload.as_ref())
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn panicking_listener_does_not_stop_the_others() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        bus.subscribe(|_| panic!("listener failed"));
        let counter = hits.clone();
        bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(ScanEvent::AllJobsComplete);
        bus.emit(ScanEvent::AllJobsComplete);

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn listeners_receive_events_until_unsubscribed() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let id = bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(ScanEvent::AllJobsComplete);
        assert!(bus.unsubscribe(id));
        bus.emit(ScanEvent::AllJobsComplete);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!bus.unsubscribe(id));
    }

    #[test]
    fn channel_subscription_preserves_order() {
        let bus = EventBus::new();
        let (_id, rx) = bus.subscribe_channel();
        bus.emit(ScanEvent::JobStarted { folder: "/a".into() });
        bus.emit(ScanEvent::JobStarted { folder: "/b".into() });

        let folders: Vec<PathBuf> = rx
            .try_iter()
            .filter_map(|e| e.folder().cloned())
            .collect();
        assert_eq!(folders, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }

    #[test]
    fn listener_may_subscribe_reentrantly() {
        let bus = Arc::new(EventBus::new());
        let inner = bus.clone();
        bus.subscribe(move |_| {
            inner.subscribe(|_| {});
        });
        bus.emit(ScanEvent::AllJobsComplete);
    }
}
