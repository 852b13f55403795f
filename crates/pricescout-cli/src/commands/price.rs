use std::sync::Arc;

use pricescout_core::{
    CacheMode, CurrencyPreference, PriceRequest, PriceService, ResilientFetcher, SourceRegistry,
    UtcDateTime,
};
use serde_json::json;
use time::Duration;

use crate::cli::{PriceArgs, PriceCommand, PriceTarget};
use crate::error::CliError;

use super::CommandOutput;

pub async fn run(
    args: &PriceArgs,
    registry: Arc<SourceRegistry>,
    fetcher: ResilientFetcher,
    cache_mode: CacheMode,
) -> Result<CommandOutput, CliError> {
    let service = PriceService::new(registry)
        .with_fetcher(fetcher)
        .with_cache_mode(cache_mode);

    match &args.command {
        PriceCommand::History(target) => {
            let request = request_for(target)?;
            let history = service.price_history(&request).await?;
            let text = match (history.first(), history.last()) {
                (Some(first), Some(last)) => format!(
                    "{} daily prices in {} from {} to {}",
                    history.len(),
                    history.currency(),
                    first.ts,
                    last.ts
                ),
                _ => format!("no prices in {}", history.currency()),
            };
            let data = json!({
                "request": request_json(&request),
                "history": serde_json::to_value(&history)?,
            });
            Ok(CommandOutput::ok(data, text))
        }
        PriceCommand::Point(point) => {
            let request = request_for(&point.target)?;
            let when = UtcDateTime::parse(&point.when)?;
            let max_deviation = point
                .max_deviation_days
                .map(|days| Duration::days(i64::from(days)));
            let price = service.price_point(&request, when, max_deviation).await?;
            point_output(&request, &price)
        }
        PriceCommand::Strict(strict) => {
            let request = request_for(&strict.target)?;
            let when = UtcDateTime::parse(&strict.when)?;
            let price = service.price_point_strict(&request, when).await?;
            point_output(&request, &price)
        }
        PriceCommand::Latest(target) => {
            let request = request_for(target)?;
            let price = service.price_latest(&request).await?;
            point_output(&request, &price)
        }
    }
}

fn request_for(target: &PriceTarget) -> Result<PriceRequest, CliError> {
    let currency = target.currency.parse::<CurrencyPreference>()?;
    Ok(PriceRequest::new(target.query.as_str(), target.source.into()).with_currency(currency))
}

fn request_json(request: &PriceRequest) -> serde_json::Value {
    json!({
        "query": request.query.to_string(),
        "source": request.source,
        "currency": request.currency.as_str(),
    })
}

fn point_output(
    request: &PriceRequest,
    price: &pricescout_core::PricePoint,
) -> Result<CommandOutput, CliError> {
    let data = json!({
        "request": request_json(request),
        "price": serde_json::to_value(price)?,
    });
    Ok(CommandOutput::ok(data, price.to_string()))
}
