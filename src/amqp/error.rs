use thiserror::Error;

pub type SpaceballzResult<T> = Result<T, SpaceballzError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpaceballzError {
    #[error("Generic: {0}")]
    Generic(String),

    #[error("Dial: {0}")]
    Dial(String),

    #[error("Channel: {0}")]
    Channel(String),

    #[error("Queue Consume: {0}")]
    Consume(String),

    #[error("Consumer cancel failed: {0}")]
    Cancel(String),

    #[error("AMQP connection close error: {0}")]
    Close(String),

    #[error("Publish to {queue} failed: {reason}")]
    Publish { queue: String, reason: String },

    #[error("Delivery stream failed: {0}")]
    Delivery(String),

    #[error("Could not settle delivery: {0}")]
    Settle(String),

    #[error("Could not open {path}: {reason}")]
    FileOpen { path: String, reason: String },

    #[error("Delivery handler exited without reporting completion")]
    HandlerLost,

    #[error("Invalid configuration: {0}")]
    ConfigurationError(&'static str),
}

macro_rules! error_from {
    ($err:ty, $spaceballz_error:ident, $func:expr) => {
        impl From<$err> for SpaceballzError {
            fn from(value: $err) -> Self {
                SpaceballzError::$spaceballz_error($func(value))
            }
        }
    };
    ($err:ty, $spaceballz_error:ident) => {
        impl From<$err> for SpaceballzError {
            fn from(value: $err) -> Self {
                SpaceballzError::$spaceballz_error(value.to_string())
            }
        }
    };
}

error_from!(lapin::Error, Generic);
error_from!(std::io::Error, Generic, |e: std::io::Error| format!(
    "{:?}: {e}",
    e.kind()
));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failing_step() {
        assert_eq!(
            SpaceballzError::Dial("connection refused".into()).to_string(),
            "Dial: connection refused"
        );
        assert_eq!(
            SpaceballzError::ConfigurationError("must suck or blow").to_string(),
            "Invalid configuration: must suck or blow"
        );
        assert_eq!(
            SpaceballzError::Publish {
                queue: "Q".into(),
                reason: "channel closed".into()
            }
            .to_string(),
            "Publish to Q failed: channel closed"
        );
    }

    #[test]
    fn test_io_error_keeps_its_kind() {
        let err: SpaceballzError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err, SpaceballzError::Generic("NotFound: gone".into()));
    }
}
