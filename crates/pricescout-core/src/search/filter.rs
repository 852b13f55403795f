use crate::{AssetClass, SourceId, Symbol};

/// Attribute predicate applied to search results.
///
/// Every set field must match. A symbol lacking an attribute never matches a
/// filter on that attribute. Text attributes compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolFilter {
    pub source: Option<SourceId>,
    pub asset_class: Option<AssetClass>,
    pub country: Option<String>,
    pub exchange: Option<String>,
    pub currency: Option<String>,
}

impl SymbolFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, source: SourceId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn asset_class(mut self, asset_class: AssetClass) -> Self {
        self.asset_class = Some(asset_class);
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = Some(exchange.into());
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.describe().is_empty()
    }

    pub fn matches(&self, symbol: &Symbol) -> bool {
        self.source.map_or(true, |source| symbol.source() == source)
            && self
                .asset_class
                .map_or(true, |class| symbol.asset_class() == Some(class))
            && text_matches(self.country.as_deref(), symbol.country())
            && text_matches(self.exchange.as_deref(), symbol.exchange())
            && text_matches(self.currency.as_deref(), symbol.currency())
    }

    /// One `key=value` entry per set field, in a fixed order.
    pub fn describe(&self) -> Vec<String> {
        let mut entries = Vec::new();
        if let Some(source) = self.source {
            entries.push(format!("source={source}"));
        }
        if let Some(asset_class) = self.asset_class {
            entries.push(format!("asset_class={asset_class}"));
        }
        if let Some(country) = &self.country {
            entries.push(format!("country={country}"));
        }
        if let Some(exchange) = &self.exchange {
            entries.push(format!("exchange={exchange}"));
        }
        if let Some(currency) = &self.currency {
            entries.push(format!("currency={currency}"));
        }
        entries
    }
}

fn text_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match (wanted, actual) {
        (None, _) => true,
        (Some(wanted), Some(actual)) => wanted.trim().eq_ignore_ascii_case(actual.trim()),
        (Some(_), None) => false,
    }
}
