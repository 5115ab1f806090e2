use crate::amqp::error::{SpaceballzError, SpaceballzResult};
use crate::amqp::session::Session;
use crate::consts::{
    CONTENT_ENCODING, CONTENT_TYPE, DEFAULT_EXCHANGE, DEFAULT_PRIORITY, DELIVERY_MODE_PERSISTENT,
};
use crate::util::trim_line_ending;
use async_trait::async_trait;
use lapin::options::BasicPublishOptions;
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel};
use std::future::Future;
use std::ops::AddAssign;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `body` to the default exchange, routed by `routing_key`.
    async fn publish(&self, routing_key: &str, body: &[u8]) -> SpaceballzResult<()>;
}

/// Persistent `text/plain` with no encoding, default priority and no headers.
pub fn text_properties() -> BasicProperties {
    BasicProperties::default()
        .with_headers(FieldTable::default())
        .with_content_type(CONTENT_TYPE.into())
        .with_content_encoding(CONTENT_ENCODING.into())
        .with_delivery_mode(DELIVERY_MODE_PERSISTENT)
        .with_priority(DEFAULT_PRIORITY)
}

#[async_trait]
impl Publisher for Channel {
    async fn publish(&self, routing_key: &str, body: &[u8]) -> SpaceballzResult<()> {
        let publish_error = |e: lapin::Error| SpaceballzError::Publish {
            queue: routing_key.to_string(),
            reason: e.to_string(),
        };
        self.basic_publish(
            DEFAULT_EXCHANGE,
            routing_key,
            BasicPublishOptions {
                mandatory: false,
                immediate: false,
            },
            body,
            text_properties(),
        )
        .await
        .map_err(publish_error)?
        .await
        .map_err(publish_error)?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BlowReport {
    pub published: usize,
    pub failed: usize,
}

impl AddAssign for BlowReport {
    fn add_assign(&mut self, other: Self) {
        self.published += other.published;
        self.failed += other.failed;
    }
}

/// Publish every line of `reader` as its own message, in order.
///
/// Lines are split on `\n`; a trailing `\r` is dropped and a final line
/// without a terminator still counts. A failed publish is logged and counted
/// but does not stop the remaining lines.
pub async fn publish_lines<R, P>(
    mut reader: R,
    publisher: &P,
    queue: &str,
) -> SpaceballzResult<BlowReport>
where
    R: AsyncBufRead + Unpin,
    P: Publisher + ?Sized,
{
    let mut report = BlowReport::default();
    let mut line = Vec::new();
    let mut line_number: usize = 0;
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        line_number += 1;
        let body = trim_line_ending(&line);
        debug!("Publishing {}", String::from_utf8_lossy(body));
        match publisher.publish(queue, body).await {
            Ok(()) => report.published += 1,
            Err(e) => {
                warn!("line {}: {}", line_number, e);
                report.failed += 1;
            }
        }
    }
    Ok(report)
}

/// Publish the lines of each file to `queue`, then hold the connection open
/// until `shutdown` resolves.
pub async fn blow<F>(
    uri: &str,
    queue: &str,
    files: &[PathBuf],
    shutdown: F,
) -> SpaceballzResult<BlowReport>
where
    F: Future<Output = SpaceballzResult<()>>,
{
    let session = Session::connect(uri).await?;
    info!("blower instantiated");

    let mut report = BlowReport::default();
    for path in files {
        let file = File::open(path)
            .await
            .map_err(|e| SpaceballzError::FileOpen {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        info!("Publishing {} to queue {}", path.display(), queue);
        report += publish_lines(BufReader::new(file), session.channel(), queue).await?;
    }
    info!(
        "Published {} lines to {} ({} failed)",
        report.published, queue, report.failed
    );

    shutdown.await?;
    session.close().await?;
    Ok(report)
}
