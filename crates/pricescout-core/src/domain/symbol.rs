use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{AssetClass, SourceId, ValidationError};

/// Opaque value a source needs to fetch prices for a symbol.
///
/// Most sources accept a plain ticker or id. Sources that need several fields
/// use the structured form, whose canonical string has sorted keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SymbolQuery {
    Text(String),
    Structured(BTreeMap<String, String>),
}

impl SymbolQuery {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured(_) => None,
        }
    }
}

impl Display for SymbolQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Structured(fields) => {
                f.write_str("{")?;
                for (index, (key, value)) in fields.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for SymbolQuery {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for SymbolQuery {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<BTreeMap<String, String>> for SymbolQuery {
    fn from(value: BTreeMap<String, String>) -> Self {
        Self::Structured(value)
    }
}

/// Optional descriptive attributes a source may report for a symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_class: Option<AssetClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl SymbolAttributes {
    pub fn is_empty(&self) -> bool {
        self.asset_class.is_none()
            && self.country.is_none()
            && self.exchange.is_none()
            && self.currency.is_none()
    }
}

/// A tradable asset as identified by one particular source.
///
/// Fields are fixed at construction; use the `with_*` builders while
/// assembling a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    name: String,
    query: SymbolQuery,
    source: SourceId,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    aliases: Vec<String>,
    #[serde(flatten)]
    attributes: SymbolAttributes,
}

impl Symbol {
    /// Creates a symbol whose query defaults to its name.
    pub fn new(name: impl Into<String>, source: SourceId) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(ValidationError::EmptySymbolName);
        }

        Ok(Self {
            query: SymbolQuery::Text(name.clone()),
            name,
            source,
            aliases: Vec::new(),
            attributes: SymbolAttributes::default(),
        })
    }

    pub fn with_query(mut self, query: impl Into<SymbolQuery>) -> Self {
        self.query = query.into();
        self
    }

    /// Adds aliases, skipping blanks, repeats and the name itself.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for alias in aliases {
            let alias = alias.into().trim().to_owned();
            if alias.is_empty() || alias == self.name || self.aliases.contains(&alias) {
                continue;
            }
            self.aliases.push(alias);
        }
        self
    }

    pub fn with_attributes(mut self, attributes: SymbolAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn query(&self) -> &SymbolQuery {
        &self.query
    }

    pub fn source(&self) -> SourceId {
        self.source
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn attributes(&self) -> &SymbolAttributes {
        &self.attributes
    }

    pub fn asset_class(&self) -> Option<AssetClass> {
        self.attributes.asset_class
    }

    pub fn country(&self) -> Option<&str> {
        self.attributes.country.as_deref()
    }

    pub fn exchange(&self) -> Option<&str> {
        self.attributes.exchange.as_deref()
    }

    pub fn currency(&self) -> Option<&str> {
        self.attributes.currency.as_deref()
    }

    /// Canonical string form of the query.
    pub fn query_string(&self) -> String {
        self.query.to_string()
    }

    /// Key that identifies the same asset from the same source.
    pub fn identity_key(&self) -> String {
        format!("{}:{}", self.source, self.query)
    }

    /// True when `what` names this symbol, either directly, through an alias,
    /// or through the part before an exchange suffix (`BMW.DE` matches `bmw`).
    pub fn matches(&self, what: &str) -> bool {
        let what = what.trim().to_lowercase();
        if what.is_empty() {
            return false;
        }

        let name = self.name.to_lowercase();
        let stem = name.split('.').next().unwrap_or(&name);
        name == what
            || stem == what
            || self
                .aliases
                .iter()
                .any(|alias| alias.to_lowercase() == what)
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, query {})", self.name, self.source, self.query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults_to_name() {
        let symbol = Symbol::new(" AAPL ", SourceId::Yahoo).expect("valid symbol");

        assert_eq!(symbol.name(), "AAPL");
        assert_eq!(symbol.query(), &SymbolQuery::Text(String::from("AAPL")));
        assert_eq!(symbol.identity_key(), "yahoo:AAPL");
    }

    #[test]
    fn rejects_empty_name() {
        let err = Symbol::new("   ", SourceId::Coingecko).expect_err("must fail");
        assert_eq!(err, ValidationError::EmptySymbolName);
    }

    #[test]
    fn aliases_skip_blanks_and_repeats() {
        let symbol = Symbol::new("eth", SourceId::Coingecko)
            .expect("valid symbol")
            .with_query("ethereum")
            .with_aliases(["ethereum", "", "Ethereum", "ethereum", "eth"]);

        assert_eq!(symbol.aliases(), ["ethereum", "Ethereum"]);
    }

    #[test]
    fn structured_query_has_sorted_canonical_form() {
        let mut fields = BTreeMap::new();
        fields.insert(String::from("pair_type"), String::from("stocks"));
        fields.insert(String::from("id"), String::from("6408"));
        let symbol = Symbol::new("AAPL", SourceId::Yahoo)
            .expect("valid symbol")
            .with_query(fields);

        assert_eq!(symbol.query_string(), "{id: 6408, pair_type: stocks}");
    }

    #[test]
    fn matches_name_alias_and_exchange_stem() {
        let symbol = Symbol::new("BMW.DE", SourceId::Yahoo)
            .expect("valid symbol")
            .with_aliases(["Bayerische Motoren Werke AG"]);

        assert!(symbol.matches("bmw"));
        assert!(symbol.matches("BMW.DE"));
        assert!(symbol.matches("bayerische motoren werke ag"));
        assert!(!symbol.matches("bayerische"));
        assert!(!symbol.matches(""));
    }
}
