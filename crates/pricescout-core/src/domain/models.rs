use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{UtcDateTime, ValidationError};

/// Canonical instrument class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Equity,
    Etf,
    Index,
    Crypto,
    Forex,
    Fund,
    Other,
}

impl AssetClass {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equity => "equity",
            Self::Etf => "etf",
            Self::Index => "index",
            Self::Crypto => "crypto",
            Self::Forex => "forex",
            Self::Fund => "fund",
            Self::Other => "other",
        }
    }
}

impl Display for AssetClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetClass {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "equity" | "stock" => Ok(Self::Equity),
            "etf" => Ok(Self::Etf),
            "index" => Ok(Self::Index),
            "crypto" | "cryptocurrency" => Ok(Self::Crypto),
            "forex" | "currency" => Ok(Self::Forex),
            "fund" | "mutualfund" => Ok(Self::Fund),
            "other" => Ok(Self::Other),
            _ => Err(ValidationError::InvalidAssetClass {
                value: value.to_owned(),
            }),
        }
    }
}

/// Currency the caller would like prices expressed in. Sources may ignore it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyPreference(String);

impl CurrencyPreference {
    pub fn new(code: &str) -> Result<Self, ValidationError> {
        validate_currency_code(code).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyPreference {
    fn default() -> Self {
        Self(String::from("USD"))
    }
}

impl Display for CurrencyPreference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyPreference {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for CurrencyPreference {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CurrencyPreference> for String {
    fn from(value: CurrencyPreference) -> Self {
        value.0
    }
}

/// One observation of a daily price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub ts: UtcDateTime,
    pub close: f64,
}

/// Time-indexed closing prices with the currency they are effectively in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceHistory {
    currency: String,
    series: Vec<PriceEntry>,
}

impl PriceHistory {
    /// Validates that timestamps strictly increase and closes are finite and
    /// non-negative.
    pub fn new(series: Vec<PriceEntry>, currency: impl AsRef<str>) -> Result<Self, ValidationError> {
        let currency = validate_currency_code(currency.as_ref())?;

        for (index, entry) in series.iter().enumerate() {
            validate_non_negative("close", entry.close)?;
            if index > 0 && series[index - 1].ts >= entry.ts {
                return Err(ValidationError::UnorderedSeries { index });
            }
        }

        Ok(Self { currency, series })
    }

    pub fn from_points<I>(points: I, currency: impl AsRef<str>) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (UtcDateTime, f64)>,
    {
        let series = points
            .into_iter()
            .map(|(ts, close)| PriceEntry { ts, close })
            .collect();
        Self::new(series, currency)
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn series(&self) -> &[PriceEntry] {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn first(&self) -> Option<&PriceEntry> {
        self.series.first()
    }

    pub fn last(&self) -> Option<&PriceEntry> {
        self.series.last()
    }
}

/// A single resolved price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub when: UtcDateTime,
    pub price: f64,
    pub currency: String,
}

impl PricePoint {
    pub fn new(when: UtcDateTime, price: f64, currency: impl Into<String>) -> Self {
        Self {
            when,
            price,
            currency: currency.into(),
        }
    }
}

impl Display for PricePoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} at {}", self.price, self.currency, self.when)
    }
}

/// Validate and normalize a currency code to uppercase.
///
/// Three letters covers ISO codes; crypto sources also quote in short tickers
/// such as `BTC` or `SATS`, so up to five alphanumerics are accepted.
pub fn validate_currency_code(input: &str) -> Result<String, ValidationError> {
    let normalized = input.trim().to_ascii_uppercase();
    let is_valid = (3..=5).contains(&normalized.len())
        && normalized.chars().all(|ch| ch.is_ascii_alphanumeric());

    if !is_valid {
        return Err(ValidationError::InvalidCurrency {
            value: input.to_owned(),
        });
    }

    Ok(normalized)
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
