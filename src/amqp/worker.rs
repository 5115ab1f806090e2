//! The contract between the delivery loop and whatever processes a message.
//!
//! A worker sees one message body and answers with an [`Outcome`]:
//! - `Ack` when processing succeeded and the broker may drop the message.
//! - `Reject` when the message conflicts with existing state (a duplicate key,
//!   say) and must not be redelivered.
//! - `Nack` when a dependency failed and the message should be retried.

use crate::amqp::error::{SpaceballzError, SpaceballzResult};
use async_trait::async_trait;
use lapin::message::Delivery;
use lapin::options::{BasicAckOptions, BasicNackOptions, BasicRejectOptions};
use std::fmt::Display;
use std::io::{self, Write};
use tokio::sync::oneshot;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Ack,
    Reject,
    Nack,
}

pub trait Worker: Send + 'static {
    fn work(&mut self, body: &[u8]) -> Outcome;
}

impl<F> Worker for F
where
    F: FnMut(&[u8]) -> Outcome + Send + 'static,
{
    fn work(&mut self, body: &[u8]) -> Outcome {
        self(body)
    }
}

/// Prints every body on its own line and acknowledges it.
pub struct PrintWorker<W> {
    out: W,
}

impl PrintWorker<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> PrintWorker<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn print(&mut self, body: &[u8]) -> io::Result<()> {
        self.out.write_all(body)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

impl<W: Write + Send + 'static> Worker for PrintWorker<W> {
    fn work(&mut self, body: &[u8]) -> Outcome {
        // A failed print still acks; there is nobody to report it to.
        if let Err(e) = self.print(body) {
            debug!("Could not print delivery: {}", e);
        }
        Outcome::Ack
    }
}

/// Something that can be told how a delivery ended.
#[async_trait]
pub trait Settle: Send + Sync {
    fn body(&self) -> &[u8];

    async fn settle(&self, outcome: Outcome) -> SpaceballzResult<()>;
}

#[async_trait]
impl Settle for Delivery {
    fn body(&self) -> &[u8] {
        &self.data
    }

    async fn settle(&self, outcome: Outcome) -> SpaceballzResult<()> {
        let settled = match outcome {
            Outcome::Ack => self.acker.ack(BasicAckOptions { multiple: false }).await,
            Outcome::Reject => self.acker.reject(BasicRejectOptions { requeue: false }).await,
            Outcome::Nack => {
                self.acker
                    .nack(BasicNackOptions {
                        multiple: false,
                        requeue: true,
                    })
                    .await
            }
        };
        settled
            .map(|_| ())
            .map_err(|e| SpaceballzError::Settle(e.to_string()))
    }
}

/// Run every delivery through `worker`, one at a time, until the stream closes.
///
/// A delivery whose settlement fails is logged and skipped. An error from the
/// stream itself ends the loop and is returned.
pub async fn handle<S, D, E, W>(mut deliveries: S, mut worker: W) -> SpaceballzResult<()>
where
    S: Stream<Item = Result<D, E>> + Unpin,
    D: Settle,
    E: Display,
    W: Worker,
{
    while let Some(delivery) = deliveries.next().await {
        let delivery = match delivery {
            Ok(delivery) => delivery,
            Err(e) => {
                warn!("handle: delivery stream failed: {}", e);
                return Err(SpaceballzError::Delivery(e.to_string()));
            }
        };
        let outcome = worker.work(delivery.body());
        if let Err(e) = delivery.settle(outcome).await {
            warn!("handle: {:?} not applied: {}", outcome, e);
        }
    }
    info!("handle: deliveries channel closed");
    Ok(())
}

/// Single-use handoff from the delivery loop to whoever shuts it down.
pub struct Completion {
    done: oneshot::Receiver<SpaceballzResult<()>>,
}

impl Completion {
    /// Spawn [`handle`] on its own task.
    pub fn spawn<S, D, E, W>(deliveries: S, worker: W) -> Self
    where
        S: Stream<Item = Result<D, E>> + Unpin + Send + 'static,
        D: Settle + 'static,
        E: Display + Send + 'static,
        W: Worker,
    {
        let (done_tx, done_rx) = oneshot::channel();
        tokio::spawn(async move {
            let _ = done_tx.send(handle(deliveries, worker).await);
        });
        Self { done: done_rx }
    }

    /// Resolves once the loop has observed the end of its stream.
    pub async fn wait(self) -> SpaceballzResult<()> {
        self.done.await.map_err(|_| SpaceballzError::HandlerLost)?
    }
}
