//! CLI argument definitions for pricescout.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `search` | Search all sources and print ranked, bucketed hits |
//! | `price history` | Full daily history of a symbol |
//! | `price point` | Price nearest to a date, optionally bounded |
//! | `price strict` | Price recorded exactly at a date |
//! | `price latest` | Most recent price |
//! | `sources` | Configured sources and their pacing policy |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--max-tries` | `100` | Attempt budget per source call |
//! | `--cache` | `use` | Price history cache mode (use, refresh, bypass) |
//!
//! # Examples
//!
//! ```bash
//! pricescout search bitcoin --source coingecko --format table
//! pricescout price point AAPL --source yahoo --when 2018-01-11 --max-deviation-days 3
//! PRICESCOUT_COINGECKO_WAIT_MS=6000 pricescout price latest bitcoin --source coingecko --currency eur
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use pricescout_core::{CacheMode, SourceId};

/// Symbol search and historical prices from rate-limited public sources.
#[derive(Debug, Parser)]
#[command(name = "pricescout", author, version, about)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Attempts per source call before giving up on transient failures and
    /// rate limits.
    #[arg(long, global = true, default_value_t = 100)]
    pub max_tries: u32,

    /// How price lookups use the in-memory history cache.
    #[arg(long, global = true, value_enum, default_value_t = CacheArg::Use)]
    pub cache: CacheArg,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    Table,
    /// Single JSON document.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    Yahoo,
    Coingecko,
}

impl From<SourceArg> for SourceId {
    fn from(value: SourceArg) -> Self {
        match value {
            SourceArg::Yahoo => Self::Yahoo,
            SourceArg::Coingecko => Self::Coingecko,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheArg {
    Use,
    Refresh,
    Bypass,
}

impl From<CacheArg> for CacheMode {
    fn from(value: CacheArg) -> Self {
        match value {
            CacheArg::Use => Self::Use,
            CacheArg::Refresh => Self::Refresh,
            CacheArg::Bypass => Self::Bypass,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search every source for a symbol.
    ///
    ///   pricescout search ethereum
    ///   pricescout search apple --source yahoo --asset-class equity
    Search(SearchArgs),

    /// Fetch prices for a symbol from one source.
    Price(PriceArgs),

    /// List configured sources with their pacing policy.
    ///
    /// Each invocation builds a fresh registry, so call counters in the JSON
    /// output always start at zero.
    Sources,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Free-form search text.
    pub query: String,

    /// Keep only hits from this source.
    #[arg(long, value_enum)]
    pub source: Option<SourceArg>,

    /// Keep only hits of this asset class (equity, etf, index, crypto, forex, fund, other).
    #[arg(long)]
    pub asset_class: Option<String>,

    /// Keep only hits reported for this country.
    #[arg(long)]
    pub country: Option<String>,

    /// Keep only hits listed on this exchange.
    #[arg(long)]
    pub exchange: Option<String>,
}

#[derive(Debug, Args)]
pub struct PriceArgs {
    #[command(subcommand)]
    pub command: PriceCommand,
}

#[derive(Debug, Subcommand)]
pub enum PriceCommand {
    /// Full daily price history.
    History(PriceTarget),
    /// Price nearest to a date.
    Point(PointArgs),
    /// Price recorded exactly at a date.
    Strict(StrictArgs),
    /// Most recent price.
    Latest(PriceTarget),
}

/// Which symbol to price, where, and in which currency.
#[derive(Debug, Args)]
pub struct PriceTarget {
    /// Source-specific query: a ticker for yahoo, a coin id for coingecko.
    pub query: String,

    #[arg(long, value_enum)]
    pub source: SourceArg,

    /// Preferred currency; sources that quote in a fixed currency ignore it.
    #[arg(long, default_value = "USD")]
    pub currency: String,
}

#[derive(Debug, Args)]
pub struct PointArgs {
    #[command(flatten)]
    pub target: PriceTarget,

    /// RFC3339 UTC timestamp or YYYY-MM-DD.
    #[arg(long)]
    pub when: String,

    /// Fail when the nearest price is further than this many days away.
    #[arg(long)]
    pub max_deviation_days: Option<u32>,
}

#[derive(Debug, Args)]
pub struct StrictArgs {
    #[command(flatten)]
    pub target: PriceTarget,

    /// RFC3339 UTC timestamp or YYYY-MM-DD.
    #[arg(long)]
    pub when: String,
}
