mod price;
mod search;
mod sources;

use std::sync::Arc;

use pricescout_core::{ResilientFetcher, RetryPolicy, SourceRegistry};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// What a command produced: a JSON document plus its text rendering.
pub struct CommandOutput {
    pub data: Value,
    pub text: String,
    /// Set when some sources failed and nothing usable came back.
    pub partial: bool,
}

impl CommandOutput {
    pub fn ok(data: Value, text: impl Into<String>) -> Self {
        Self {
            data,
            text: text.into(),
            partial: false,
        }
    }

    pub fn with_partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }
}

pub async fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    let registry = Arc::new(SourceRegistry::builder().with_env_overrides().build());
    let fetcher = ResilientFetcher::new(RetryPolicy::new(cli.max_tries));
    debug!(sources = ?registry.ids(), max_tries = cli.max_tries, "source registry ready");

    match &cli.command {
        Command::Search(args) => search::run(args, registry, fetcher).await,
        Command::Price(args) => price::run(args, registry, fetcher, cli.cache.into()).await,
        Command::Sources => sources::run(&registry),
    }
}
