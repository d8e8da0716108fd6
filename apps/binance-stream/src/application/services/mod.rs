//! Application Services
//!
//! The streaming engine and its coordination:
//!
//! - `StreamListener`: Reconnecting, decoding consumer of one feed endpoint
//! - `KeepAliveTask`: Periodic listen key refresh
//! - `UserFeed`: Listen key acquisition, keep-alive and listener under one
//!   cancellation token
//! - `FeedStream`: Caller-facing event stream; dropping it tears the feed down

mod diagnostics;
mod keepalive;
mod listener;
mod reconnect;
mod stream;
mod user_feed;

pub use diagnostics::{DIAGNOSTICS_CAPACITY, DiagnosticsSender, FeedDiagnostic};
pub use keepalive::{DEFAULT_KEEPALIVE_INTERVAL, KeepAliveTask, MAX_KEEPALIVE_INTERVAL};
pub use listener::StreamListener;
pub use reconnect::{ReconnectConfig, ReconnectPolicy};
pub use stream::FeedStream;
pub use user_feed::{UserFeed, UserFeedError};
