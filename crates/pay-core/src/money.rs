//! # Money Types
//!
//! Currency and amount types shared by the checkout snapshot and the
//! provider adapters. Amounts are always held in the smallest currency unit.

use serde::{Deserialize, Serialize};

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
    CHF,
    MXN,
}

impl Currency {
    /// Returns the ISO 4217 alphabetic code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::CHF => "CHF",
            Currency::MXN => "MXN",
        }
    }

    /// Returns the ISO 4217 numeric code, as the Cardinal order details expect
    pub fn numeric_code(&self) -> &'static str {
        match self {
            Currency::USD => "840",
            Currency::EUR => "978",
            Currency::GBP => "826",
            Currency::JPY => "392",
            Currency::CAD => "124",
            Currency::AUD => "036",
            Currency::CHF => "756",
            Currency::MXN => "484",
        }
    }

    /// Returns the number of decimal places for this currency
    /// (JPY has 0 decimals, most others have 2)
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Amount in the smallest currency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: i64,
    pub currency: Currency,
}

impl Money {
    /// Create from the smallest unit (cents)
    pub fn from_minor(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let places = self.currency.decimal_places() as u32;
        let divisor = 10_i64.pow(places);
        let (units, minor) = (self.amount / divisor, (self.amount % divisor).abs());
        let sign = if self.amount < 0 && units == 0 { "-" } else { "" };

        if places == 0 {
            write!(f, "{} {}", self.amount, self.currency)
        } else {
            write!(
                f,
                "{}{}.{:0width$} {}",
                sign,
                units,
                minor,
                self.currency,
                width = places as usize
            )
        }
    }
}
