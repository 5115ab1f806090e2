//! Blow the lines of text files into an AMQP queue, or suck a queue dry.
//!
//! - `amqp::session` dials the broker and watches the connection.
//! - `amqp::blower` publishes lines as persistent messages.
//! - `amqp::sucker` subscribes and hands deliveries to a `Worker`.

pub(crate) mod consts;

pub mod amqp;
pub mod util;
