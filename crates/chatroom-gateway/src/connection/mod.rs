//! Client connections

mod client;

pub use client::{Client, SEND_QUEUE_CAPACITY};
