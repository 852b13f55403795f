use std::sync::Arc;

use pricescout_core::{
    AssetClass, ResilientFetcher, SearchAggregator, SourceRegistry, SymbolFilter,
};

use crate::cli::SearchArgs;
use crate::error::CliError;

use super::CommandOutput;

pub async fn run(
    args: &SearchArgs,
    registry: Arc<SourceRegistry>,
    fetcher: ResilientFetcher,
) -> Result<CommandOutput, CliError> {
    let filter = build_filter(args)?;

    let aggregator = SearchAggregator::new(registry).with_fetcher(fetcher);
    let mut result = aggregator.search(&args.query).await?;
    if !filter.is_empty() {
        result = result.filter(&filter);
    }

    let partial = result.is_empty() && !result.failures().is_empty();
    let text = result.to_string();
    let data = serde_json::to_value(&result)?;

    Ok(CommandOutput::ok(data, text).with_partial(partial))
}

fn build_filter(args: &SearchArgs) -> Result<SymbolFilter, CliError> {
    let mut filter = SymbolFilter::new();
    if let Some(source) = args.source {
        filter = filter.source(source.into());
    }
    if let Some(asset_class) = &args.asset_class {
        filter = filter.asset_class(asset_class.parse::<AssetClass>()?);
    }
    if let Some(country) = &args.country {
        filter = filter.country(country.as_str());
    }
    if let Some(exchange) = &args.exchange {
        filter = filter.exchange(exchange.as_str());
    }
    Ok(filter)
}
