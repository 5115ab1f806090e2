use crate::amqp::error::{SpaceballzError, SpaceballzResult};
use crate::amqp::session::Session;
use crate::amqp::worker::{Completion, PrintWorker, Worker};
use crate::consts::CONSUMER_TAG;
use lapin::options::{BasicCancelOptions, BasicConsumeOptions};
use lapin::types::FieldTable;
use std::future::Future;
use tracing::info;

/// Manual acknowledgement on a shared, non-exclusive subscription.
pub fn consume_options() -> BasicConsumeOptions {
    BasicConsumeOptions {
        no_local: false,
        no_ack: false,
        exclusive: false,
        nowait: false,
    }
}

/// A subscription to one queue, with its deliveries handed to a [`Worker`].
pub struct Sucker {
    session: Session,
    tag: String,
    done: Completion,
}

impl Sucker {
    pub async fn new<W: Worker>(
        uri: &str,
        queue: &str,
        tag: &str,
        worker: W,
    ) -> SpaceballzResult<Self> {
        let session = Session::connect(uri).await?;

        let deliveries = session
            .channel()
            .basic_consume(queue, tag, consume_options(), FieldTable::default())
            .await
            .map_err(|e| SpaceballzError::Consume(e.to_string()))?;
        info!("Consuming {} as {:?}", queue, tag);

        let done = Completion::spawn(deliveries, worker);

        Ok(Self {
            session,
            tag: tag.to_string(),
            done,
        })
    }

    /// Cancel the subscription, close the connection and wait for the
    /// delivery loop to drain.
    pub async fn shutdown(self) -> SpaceballzResult<()> {
        let Sucker { session, tag, done } = self;

        // Cancelling ends the delivery stream.
        let cancel = async {
            session
                .channel()
                .basic_cancel(&tag, BasicCancelOptions::default())
                .await
                .map_err(|e| SpaceballzError::Cancel(e.to_string()))
        };

        teardown(cancel, session.close(), done).await
    }
}

/// Cancel, then close, then wait for the delivery loop. A failing step stops
/// the ones after it.
async fn teardown<C, X>(cancel: C, close: X, done: Completion) -> SpaceballzResult<()>
where
    C: Future<Output = SpaceballzResult<()>>,
    X: Future<Output = SpaceballzResult<()>>,
{
    cancel.await?;
    close.await?;

    let result = done.wait().await;
    info!("AMQP shutdown OK");
    result
}

/// Print every message on `queue` to stdout until `shutdown` resolves.
pub async fn suck<F>(uri: &str, queue: &str, shutdown: F) -> SpaceballzResult<()>
where
    F: Future<Output = SpaceballzResult<()>>,
{
    let sucker = Sucker::new(uri, queue, CONSUMER_TAG, PrintWorker::stdout()).await?;
    shutdown.await?;
    sucker.shutdown().await
}
