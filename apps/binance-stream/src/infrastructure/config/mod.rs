//! Configuration Module
//!
//! Environment-driven configuration for the streaming client.

mod settings;

pub use settings::{
    ConfigError, Credentials, FeedSettings, RestSettings, Settings, load_dotenv,
};
