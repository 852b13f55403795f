//! # Domain Models
//!
//! Canonical domain types shared by sources, search and price resolution.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | An asset as identified by one source |
//! | [`SymbolQuery`] | Opaque value a source needs to fetch prices |
//! | [`PriceHistory`] | Strictly increasing daily closes plus currency |
//! | [`PricePoint`] | One resolved price |
//! | [`CurrencyPreference`] | Desired quote currency, `USD` by default |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! All types enforce their invariants at construction time:
//!
//! ```rust
//! use pricescout_core::{PriceHistory, UtcDateTime, ValidationError};
//!
//! let early = UtcDateTime::parse("2018-01-12").unwrap();
//! let late = UtcDateTime::parse("2018-01-11").unwrap();
//! let unordered = PriceHistory::from_points([(early, 3.0), (late, 2.0)], "USD");
//! assert!(matches!(unordered, Err(ValidationError::UnorderedSeries { .. })));
//! ```

mod models;
mod symbol;
mod timestamp;

pub use models::{
    validate_currency_code, AssetClass, CurrencyPreference, PriceEntry, PriceHistory, PricePoint,
};
pub use symbol::{Symbol, SymbolAttributes, SymbolQuery};
pub use timestamp::UtcDateTime;
