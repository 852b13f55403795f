use std::sync::Arc;

use serde::Deserialize;

use super::{classify_status, parse_error, transport_error};
use crate::data_source::{RawCandidate, SourceAdapter, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::{
    AssetClass, CurrencyPreference, PriceEntry, PriceHistory, SourceId, SymbolAttributes,
    SymbolQuery, UtcDateTime,
};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";
/// 2000-01-01T00:00:00Z
const HISTORY_START_UNIX: i64 = 946_684_800;
const SEARCH_QUOTES_COUNT: usize = 50;
const REFERER: &str = "https://finance.yahoo.com/";

/// Yahoo Finance: equities, funds, indices and currencies by ticker.
///
/// Prices come in the ticker's own currency; the currency preference is
/// ignored.
pub struct YahooSource {
    http_client: Arc<dyn HttpClient>,
}

impl Default for YahooSource {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }
}

impl YahooSource {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self { http_client }
    }

    async fn fetch_history(&self, query: &SymbolQuery) -> Result<PriceHistory, SourceError> {
        let ticker = query.to_string();
        let endpoint = format!(
            "{CHART_URL}/{}?period1={HISTORY_START_UNIX}&period2={}&interval=1d&events=history",
            urlencoding::encode(&ticker),
            UtcDateTime::now().unix_timestamp(),
        );

        let response = self
            .http_client
            .execute(HttpRequest::get(endpoint).with_header("referer", REFERER))
            .await
            .map_err(|e| transport_error(SourceId::Yahoo, e))?;

        if let Some(error) = classify_status(SourceId::Yahoo, &response) {
            return Err(error);
        }
        if response.status == 404 {
            return Err(SourceError::symbol_not_found(SourceId::Yahoo, &ticker));
        }

        let chart: ChartResponse =
            serde_json::from_str(&response.body).map_err(|e| parse_error(SourceId::Yahoo, e))?;

        if let Some(error) = chart.chart.error {
            return Err(if error.code.eq_ignore_ascii_case("not found") {
                SourceError::symbol_not_found(SourceId::Yahoo, &ticker)
            } else {
                SourceError::invalid_request(format!(
                    "yahoo chart error {}: {}",
                    error.code,
                    error.description.unwrap_or_default()
                ))
            });
        }
        if response.status == 400 {
            return Err(SourceError::invalid_request(format!(
                "yahoo rejected chart request for '{ticker}'"
            )));
        }

        let result = chart
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| SourceError::symbol_not_found(SourceId::Yahoo, &ticker))?;

        let currency = result
            .meta
            .currency
            .ok_or_else(|| SourceError::internal(format!("yahoo reports no currency for '{ticker}'")))?;
        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|quote| quote.close)
            .unwrap_or_default();

        let series = daily_closes(result.timestamp.unwrap_or_default(), closes)?;
        if series.is_empty() {
            return Err(SourceError::symbol_not_found(SourceId::Yahoo, &ticker));
        }

        Ok(PriceHistory::new(series, currency)?)
    }

    async fn fetch_candidates(&self, query: &str) -> Result<Vec<RawCandidate>, SourceError> {
        let endpoint = format!(
            "{SEARCH_URL}?q={}&quotesCount={SEARCH_QUOTES_COUNT}&newsCount=0",
            urlencoding::encode(query)
        );

        let response = self
            .http_client
            .execute(HttpRequest::get(endpoint).with_header("referer", REFERER))
            .await
            .map_err(|e| transport_error(SourceId::Yahoo, e))?;

        if let Some(error) = classify_status(SourceId::Yahoo, &response) {
            return Err(error);
        }
        if !response.is_success() {
            return Err(SourceError::invalid_request(format!(
                "yahoo rejected search for '{query}' with status {}",
                response.status
            )));
        }

        let search: SearchResponse =
            serde_json::from_str(&response.body).map_err(|e| parse_error(SourceId::Yahoo, e))?;

        Ok(search.quotes.into_iter().map(SearchQuote::into_candidate).collect())
    }
}

impl SourceAdapter for YahooSource {
    fn id(&self) -> SourceId {
        SourceId::Yahoo
    }

    fn price_history<'a>(
        &'a self,
        query: &'a SymbolQuery,
        _currency: &'a CurrencyPreference,
    ) -> SourceFuture<'a, PriceHistory> {
        Box::pin(self.fetch_history(query))
    }

    fn search_candidates<'a>(&'a self, query: &'a str) -> SourceFuture<'a, Vec<RawCandidate>> {
        Box::pin(self.fetch_candidates(query))
    }
}

/// Pairs timestamps with closes, dropping gaps and any bar that does not move
/// time forward (Yahoo repeats the live bar at the end of a series).
fn daily_closes(
    timestamps: Vec<i64>,
    closes: Vec<Option<f64>>,
) -> Result<Vec<PriceEntry>, SourceError> {
    let mut series: Vec<PriceEntry> = Vec::with_capacity(timestamps.len());
    for (seconds, close) in timestamps.into_iter().zip(closes) {
        let Some(close) = close.filter(|value| value.is_finite()) else {
            continue;
        };
        let ts = UtcDateTime::from_unix_timestamp(seconds)?;
        if series.last().is_some_and(|last| last.ts >= ts) {
            continue;
        }
        series.push(PriceEntry { ts, close });
    }
    Ok(series)
}

fn asset_class_for(quote_type: &str) -> AssetClass {
    match quote_type.to_ascii_uppercase().as_str() {
        "EQUITY" => AssetClass::Equity,
        "ETF" => AssetClass::Etf,
        "INDEX" => AssetClass::Index,
        "CRYPTOCURRENCY" => AssetClass::Crypto,
        "CURRENCY" => AssetClass::Forex,
        "MUTUALFUND" => AssetClass::Fund,
        _ => AssetClass::Other,
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    symbol: String,
    #[serde(rename = "shortname", default)]
    short_name: Option<String>,
    #[serde(rename = "longname", default)]
    long_name: Option<String>,
    #[serde(rename = "quoteType", default)]
    quote_type: Option<String>,
    #[serde(default)]
    exchange: Option<String>,
}

impl SearchQuote {
    fn into_candidate(self) -> RawCandidate {
        let attributes = SymbolAttributes {
            asset_class: self.quote_type.as_deref().map(asset_class_for),
            exchange: self.exchange,
            ..SymbolAttributes::default()
        };
        RawCandidate {
            name: self.symbol,
            query: None,
            aliases: self.long_name.into_iter().chain(self.short_name).collect(),
            attributes,
        }
    }
}
