//! Application configuration

use std::ffi::OsString;

use clap::Parser;

mod db;
mod logging;
mod store;

pub use db::DatabaseConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use store::StoreConfig;

/// Farmstall application configuration
#[derive(Debug, Parser)]
#[command(name = "farmstall", about = "Farmstall order lifecycle", long_about = None)]
pub struct AppConfig {
    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Shipping and hand-off settings.
    #[command(flatten)]
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Parse configuration from explicit arguments, falling back to the
    /// environment for anything not given.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn try_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args)
    }
}
