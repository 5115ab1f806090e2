use crate::amqp::error::{SpaceballzError, SpaceballzResult};
use crate::consts::{CLOSE_REPLY_TEXT, REPLY_SUCCESS};
use lapin::{Channel, Connection, ConnectionProperties};
use std::fmt::Display;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A live connection to the broker plus the one channel every command uses.
pub struct Session {
    connection: Connection,
    channel: Channel,
    /// Logs asynchronous connection failures. Never acts on them.
    close_watcher: JoinHandle<()>,
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close_watcher.abort();
    }
}

impl Session {
    pub async fn connect(uri: &str) -> SpaceballzResult<Self> {
        info!("dialing {:?}", uri);
        let options = ConnectionProperties::default()
            // Use tokio executor and reactor.
            .with_executor(tokio_executor_trait::Tokio::current())
            .with_reactor(tokio_reactor_trait::Tokio);
        let connection = Connection::connect(uri, options)
            .await
            .map_err(|e| SpaceballzError::Dial(e.to_string()))?;

        let (errors_tx, errors_rx) = mpsc::unbounded_channel();
        connection.on_error(move |err| {
            let _ = errors_tx.send(err);
        });
        let close_watcher = spawn_close_watcher(errors_rx);

        info!("got Connection, getting Channel");
        let channel = match connection.create_channel().await {
            Ok(channel) => channel,
            Err(e) => {
                close_watcher.abort();
                return Err(SpaceballzError::Channel(e.to_string()));
            }
        };

        Ok(Self {
            connection,
            channel,
            close_watcher,
        })
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub async fn close(&self) -> SpaceballzResult<()> {
        debug!("Closing connection");
        self.connection
            .close(REPLY_SUCCESS, CLOSE_REPLY_TEXT)
            .await
            .map_err(|e| SpaceballzError::Close(e.to_string()))
    }
}

/// Wait for the first connection error and log it.
///
/// The task ends on its own once every sender is gone, which happens when the
/// connection holding the error callback is dropped.
fn spawn_close_watcher<E>(mut errors: UnboundedReceiver<E>) -> JoinHandle<()>
where
    E: Display + Send + 'static,
{
    tokio::spawn(async move {
        if let Some(err) = errors.recv().await {
            warn!("closing: {}", err);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test_log::test(tokio::test)]
    async fn test_close_watcher_finishes_after_first_error() {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let watcher = spawn_close_watcher(rx);
        tx.send("connection reset by peer".to_string()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), watcher)
            .await
            .expect("watcher should finish")
            .unwrap();
    }

    #[tokio::test]
    async fn test_close_watcher_stops_when_sender_dropped() {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let watcher = spawn_close_watcher(rx);
        drop(tx);
        tokio::time::timeout(Duration::from_secs(1), watcher)
            .await
            .expect("watcher should finish")
            .unwrap();
    }

    #[tokio::test]
    async fn test_close_watcher_can_be_aborted() {
        let (_tx, rx) = mpsc::unbounded_channel::<String>();
        let watcher = spawn_close_watcher(rx);
        watcher.abort();
        let err = watcher.await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_connect_with_malformed_uri_is_a_dial_error() {
        let err = Session::connect("definitely not a uri").await.err().unwrap();
        assert!(matches!(err, SpaceballzError::Dial(_)));
    }
}
