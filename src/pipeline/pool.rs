//! Fixed-size pool of workers draining the ingestion channel

use crate::crawler::PageData;
use crate::output::StatsSnapshot;
use crate::pipeline::worker::{process_page, WorkerContext};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// `N` concurrent consumers sharing one bounded channel
///
/// Producers block once `capacity` items are buffered. Workers exit when the
/// channel is closed and drained, or when the cancellation token fires.
///
/// # Example
///
/// ```no_run
/// # use news_sieve::pipeline::{WorkerContext, WorkerPool};
/// # use tokio_util::sync::CancellationToken;
/// # async fn demo(ctx: WorkerContext, page: news_sieve::PageData) {
/// let pool = WorkerPool::start(3, 1000, ctx, CancellationToken::new());
/// pool.submit(page).await.ok();
/// let stats = pool.stop().await;
/// println!("{}", stats);
/// # }
/// ```
pub struct WorkerPool {
    sender: mpsc::Sender<PageData>,
    handles: Vec<JoinHandle<u64>>,
    context: WorkerContext,
}

impl WorkerPool {
    /// Spawns `worker_count` workers behind a channel holding `capacity` items
    ///
    /// Zero for either value is treated as one.
    pub fn start(
        worker_count: usize,
        capacity: usize,
        context: WorkerContext,
        cancel: CancellationToken,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));

        let handles = (0..worker_count.max(1))
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    Arc::clone(&receiver),
                    context.clone(),
                    cancel.clone(),
                ))
            })
            .collect();

        tracing::debug!(
            "Started {} workers, channel capacity {}",
            worker_count.max(1),
            capacity.max(1)
        );

        Self {
            sender,
            handles,
            context,
        }
    }

    /// A producer handle for the ingestion channel
    pub fn sender(&self) -> mpsc::Sender<PageData> {
        self.sender.clone()
    }

    /// Queues one page, waiting while the channel is full
    ///
    /// Fails only when every worker has exited.
    pub async fn submit(&self, page: PageData) -> Result<(), mpsc::error::SendError<PageData>> {
        self.sender.send(page).await
    }

    /// Closes the channel and waits for every worker to finish
    ///
    /// Items already queued are processed first unless cancellation fired.
    /// Other [`WorkerPool::sender`] handles must be dropped for this to return.
    pub async fn stop(self) -> StatsSnapshot {
        drop(self.sender);

        let mut processed = 0;
        for handle in self.handles {
            match handle.await {
                Ok(count) => processed += count,
                Err(e) => tracing::error!("Worker task failed: {}", e),
            }
        }

        tracing::debug!("Worker pool stopped after {} items", processed);
        self.context.stats.snapshot()
    }
}

async fn run_worker(
    id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<PageData>>>,
    ctx: WorkerContext,
    cancel: CancellationToken,
) -> u64 {
    let mut processed = 0;

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            page = async { receiver.lock().await.recv().await } => page,
        };

        let Some(page) = next else {
            break;
        };

        let url = page.url.clone();
        let outcome = process_page(&ctx, page).await;
        tracing::trace!("Worker {} finished {}: {}", id, url, outcome);
        processed += 1;
    }

    tracing::debug!("Worker {} exiting after {} items", id, processed);
    processed
}
