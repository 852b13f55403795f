use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::debug;

use super::{classify_status, parse_error, transport_error};
use crate::data_source::{RawCandidate, SourceAdapter, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::{
    AssetClass, CurrencyPreference, PriceEntry, PriceHistory, SourceId, SymbolAttributes,
    SymbolQuery, UtcDateTime,
};

const API_BASE: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko: crypto assets by coin id, priced in the preferred currency.
pub struct CoingeckoSource {
    http_client: Arc<dyn HttpClient>,
    coin_list: OnceCell<Vec<CoinListEntry>>,
}

impl Default for CoingeckoSource {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }
}

impl CoingeckoSource {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            coin_list: OnceCell::new(),
        }
    }

    async fn fetch_history(
        &self,
        query: &SymbolQuery,
        currency: &CurrencyPreference,
    ) -> Result<PriceHistory, SourceError> {
        let coin_id = query.to_string();
        let vs_currency = currency.as_str().to_ascii_lowercase();
        let endpoint = format!(
            "{API_BASE}/coins/{}/market_chart?vs_currency={}&days=max&interval=daily",
            urlencoding::encode(&coin_id),
            urlencoding::encode(&vs_currency),
        );

        let response = self
            .http_client
            .execute(HttpRequest::get(endpoint))
            .await
            .map_err(|e| transport_error(SourceId::Coingecko, e))?;

        if let Some(error) = classify_status(SourceId::Coingecko, &response) {
            return Err(error);
        }
        match response.status {
            404 => return Err(SourceError::symbol_not_found(SourceId::Coingecko, &coin_id)),
            400 if response.body.to_ascii_lowercase().contains("vs_currency") => {
                return Err(SourceError::currency_not_supported(
                    SourceId::Coingecko,
                    currency,
                ))
            }
            400 => {
                return Err(SourceError::invalid_request(format!(
                    "coingecko rejected market chart request for '{coin_id}'"
                )))
            }
            _ => {}
        }

        let chart: MarketChart = serde_json::from_str(&response.body)
            .map_err(|e| parse_error(SourceId::Coingecko, e))?;

        let series = daily_prices(&chart.prices)?;
        if series.is_empty() {
            return Err(SourceError::symbol_not_found(SourceId::Coingecko, &coin_id));
        }

        Ok(PriceHistory::new(series, currency.as_str())?)
    }

    async fn fetch_candidates(&self, query: &str) -> Result<Vec<RawCandidate>, SourceError> {
        let needle = query.to_lowercase();
        let coins = self.coin_list().await?;

        Ok(coins
            .iter()
            .filter(|coin| coin.mentions(&needle))
            .map(CoinListEntry::to_candidate)
            .collect())
    }

    /// The full coin list, fetched once per adapter.
    async fn coin_list(&self) -> Result<&[CoinListEntry], SourceError> {
        let coins = self
            .coin_list
            .get_or_try_init(|| async {
                let response = self
                    .http_client
                    .execute(HttpRequest::get(format!("{API_BASE}/coins/list")))
                    .await
                    .map_err(|e| transport_error(SourceId::Coingecko, e))?;

                if let Some(error) = classify_status(SourceId::Coingecko, &response) {
                    return Err(error);
                }
                if !response.is_success() {
                    return Err(SourceError::internal(format!(
                        "coingecko coin list returned status {}",
                        response.status
                    )));
                }

                let coins: Vec<CoinListEntry> = serde_json::from_str(&response.body)
                    .map_err(|e| parse_error(SourceId::Coingecko, e))?;
                debug!(coins = coins.len(), "loaded coingecko coin list");
                Ok(coins)
            })
            .await?;
        Ok(coins.as_slice())
    }
}

impl SourceAdapter for CoingeckoSource {
    fn id(&self) -> SourceId {
        SourceId::Coingecko
    }

    fn price_history<'a>(
        &'a self,
        query: &'a SymbolQuery,
        currency: &'a CurrencyPreference,
    ) -> SourceFuture<'a, PriceHistory> {
        Box::pin(self.fetch_history(query, currency))
    }

    fn search_candidates<'a>(&'a self, query: &'a str) -> SourceFuture<'a, Vec<RawCandidate>> {
        Box::pin(self.fetch_candidates(query))
    }
}

/// Converts `[millis, price]` pairs. A later pair at the same instant
/// replaces the earlier one; pairs that go back in time are dropped.
fn daily_prices(prices: &[(f64, Option<f64>)]) -> Result<Vec<PriceEntry>, SourceError> {
    let mut series: Vec<PriceEntry> = Vec::with_capacity(prices.len());
    for &(millis, price) in prices {
        let Some(close) = price.filter(|value| value.is_finite()) else {
            continue;
        };
        let ts = UtcDateTime::from_unix_millis(millis as i64)?;
        if let Some(last) = series.last_mut() {
            if last.ts == ts {
                last.close = close;
                continue;
            }
            if last.ts > ts {
                continue;
            }
        }
        series.push(PriceEntry { ts, close });
    }
    Ok(series)
}

#[derive(Debug, Deserialize)]
struct MarketChart {
    #[serde(default)]
    prices: Vec<(f64, Option<f64>)>,
}

#[derive(Debug, Clone, Deserialize)]
struct CoinListEntry {
    id: String,
    symbol: String,
    name: String,
}

impl CoinListEntry {
    fn mentions(&self, needle: &str) -> bool {
        self.id.to_lowercase().contains(needle)
            || self.symbol.to_lowercase().contains(needle)
            || self.name.to_lowercase().contains(needle)
    }

    /// Ticker as name, coin id as query.
    fn to_candidate(&self) -> RawCandidate {
        RawCandidate {
            name: self.symbol.clone(),
            query: Some(SymbolQuery::Text(self.id.clone())),
            aliases: vec![self.id.clone(), self.name.clone()],
            attributes: SymbolAttributes {
                asset_class: Some(AssetClass::Crypto),
                ..SymbolAttributes::default()
            },
        }
    }
}
