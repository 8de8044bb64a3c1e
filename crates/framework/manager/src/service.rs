//! The single dispatch worker and the queue that feeds it.
//!
//! Work items are executed strictly one at a time, in enqueue order, on a
//! dedicated named thread. Producers never block: the queue is unbounded and a
//! warning is logged whenever its depth crosses the configured threshold.

use crate::dispatcher::{DispatchReport, Dispatcher};
use crate::error::{DispatchError, DispatchErrorExt};
use crate::work_item::WorkItem;
use ptf_domain::config::DispatchConfig;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug)]
enum Message {
    Execute(WorkItem),
    Shutdown,
}

/// Cloneable producer handle for the dispatch worker.
#[derive(Debug, Clone)]
pub struct WorkQueue {
    sender: mpsc::UnboundedSender<Message>,
    depth: Arc<AtomicUsize>,
    warn_depth: usize,
}

impl WorkQueue {
    /// Appends a work item. Returns immediately.
    ///
    /// # Errors
    /// Returns [`DispatchError::QueueClosed`] once the worker has stopped.
    pub fn enqueue(&self, item: WorkItem) -> Result<(), DispatchError> {
        let depth = self.depth.fetch_add(1, Ordering::AcqRel).saturating_add(1);
        if self.sender.send(Message::Execute(item)).is_err() {
            self.depth.fetch_sub(1, Ordering::AcqRel);
            return Err(DispatchError::QueueClosed { context: Some(format!("enqueue {item}").into()) });
        }

        if depth > self.warn_depth {
            warn!(%item, depth, threshold = self.warn_depth, "Dispatch queue is backing up");
        } else {
            debug!(%item, depth, "Work item enqueued");
        }
        Ok(())
    }

    /// Work items accepted but not yet executed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.depth.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Observer invoked on the worker thread after every dispatch.
pub type ReportHook = Box<dyn Fn(&DispatchReport) + Send + 'static>;

/// Owns the dispatch worker thread.
#[derive(Debug)]
pub struct DispatchService {
    queue: WorkQueue,
    worker: Option<JoinHandle<usize>>,
}

impl DispatchService {
    /// Spawns the worker thread.
    ///
    /// # Errors
    /// Returns [`DispatchError::Spawn`] if the OS refuses the thread.
    pub fn start(dispatcher: Dispatcher, config: &DispatchConfig) -> Result<Self, DispatchError> {
        Self::start_with_hook(dispatcher, config, None)
    }

    /// Like [`DispatchService::start`], reporting every dispatch to `hook`.
    ///
    /// # Errors
    /// Returns [`DispatchError::Spawn`] if the OS refuses the thread.
    pub fn start_with_hook(
        dispatcher: Dispatcher,
        config: &DispatchConfig,
        hook: Option<ReportHook>,
    ) -> Result<Self, DispatchError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let depth = Arc::new(AtomicUsize::new(0));

        let worker_depth = Arc::clone(&depth);
        let worker = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || run(&dispatcher, receiver, &worker_depth, hook.as_deref()))
            .context(format!("thread '{}'", config.thread_name))?;

        info!(thread = %config.thread_name, warn_depth = config.queue_warn_depth, "Dispatch worker started");

        Ok(Self {
            queue: WorkQueue { sender, depth, warn_depth: config.queue_warn_depth },
            worker: Some(worker),
        })
    }

    #[must_use]
    pub const fn queue(&self) -> &WorkQueue {
        &self.queue
    }

    /// Stops accepting work, executes everything already queued and joins the
    /// worker. Returns the number of work items the worker executed.
    ///
    /// # Errors
    /// Returns [`DispatchError::WorkerPanicked`] if the worker thread died.
    pub fn shutdown(mut self) -> Result<usize, DispatchError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<usize, DispatchError> {
        let Some(worker) = self.worker.take() else {
            return Ok(0);
        };

        // A send failure means the worker is already gone; join reports why.
        let _ = self.queue.sender.send(Message::Shutdown);

        worker.join().map_err(|_| DispatchError::WorkerPanicked { context: None })
    }
}

impl Drop for DispatchService {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!(error = %e, "Dispatch worker stopped abnormally");
        }
    }
}

fn run(
    dispatcher: &Dispatcher,
    mut receiver: mpsc::UnboundedReceiver<Message>,
    depth: &AtomicUsize,
    hook: Option<&(dyn Fn(&DispatchReport) + Send)>,
) -> usize {
    let mut executed = 0usize;
    let mut execute = |item: WorkItem| {
        depth.fetch_sub(1, Ordering::AcqRel);
        let report = dispatcher.execute(item);
        if let Some(hook) = hook {
            hook(&report);
        }
        executed = executed.saturating_add(1);
    };

    while let Some(message) = receiver.blocking_recv() {
        match message {
            Message::Execute(item) => execute(item),
            Message::Shutdown => {
                receiver.close();
                while let Ok(message) = receiver.try_recv() {
                    if let Message::Execute(item) = message {
                        execute(item);
                    }
                }
                break;
            },
        }
    }

    info!(executed, "Dispatch worker stopped");
    executed
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptf_participant::ParticipantRegistry;
    use ptf_policy::PolicyManager;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(ParticipantRegistry::new()), Arc::new(PolicyManager::new()))
    }

    #[test]
    fn worker_thread_carries_configured_name() {
        let config = DispatchConfig { thread_name: "ptf-dispatch-test".to_owned(), ..DispatchConfig::default() };
        let (tx, rx) = std::sync::mpsc::channel();
        let hook: ReportHook = Box::new(move |_| {
            let _ = tx.send(thread::current().name().map(str::to_owned));
        });

        let service = DispatchService::start_with_hook(dispatcher(), &config, Some(hook)).unwrap();
        service
            .queue()
            .enqueue(WorkItem::new(ptf_events::FrameworkEvent::ParticipantCreate, ptf_domain::ParticipantIndex::new(0)))
            .unwrap();
        assert_eq!(service.shutdown().unwrap(), 1);
        assert_eq!(rx.recv().unwrap().as_deref(), Some("ptf-dispatch-test"));
    }

    #[test]
    fn shutdown_of_idle_worker_executes_nothing() {
        let service = DispatchService::start(dispatcher(), &DispatchConfig::default()).unwrap();
        let queue = service.queue().clone();
        assert_eq!(service.shutdown().unwrap(), 0);
        assert!(queue.is_closed());
    }
}
