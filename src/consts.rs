// Subscription
pub(crate) const CONSUMER_TAG: &str = "spaceballz";

// Publishing
pub(crate) const DEFAULT_EXCHANGE: &str = "";
pub(crate) const CONTENT_TYPE: &str = "text/plain";
pub(crate) const CONTENT_ENCODING: &str = "";
/// AMQP delivery mode 2, the broker writes the message to disk.
pub(crate) const DELIVERY_MODE_PERSISTENT: u8 = 2;
pub(crate) const DEFAULT_PRIORITY: u8 = 0;

// Connection close
pub(crate) const REPLY_SUCCESS: u16 = 200;
pub(crate) const CLOSE_REPLY_TEXT: &str = "Bye";
