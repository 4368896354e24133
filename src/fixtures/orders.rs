//! Order Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, INR, USD},
};
use serde::Deserialize;

use crate::{fixtures::FixtureError, orders::LineItem};

/// Wrapper for an order in YAML
#[derive(Debug, Deserialize)]
pub struct OrderFixture {
    /// Order lines, in display order
    pub lines: Vec<LineItemFixture>,
}

/// Line Item Fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineItemFixture {
    /// Menu item name
    pub name: String,

    /// Unit price (e.g., "12.25 USD")
    pub price: String,

    /// Units ordered
    #[serde(default = "one")]
    pub quantity: u32,
}

const fn one() -> u32 {
    1
}

impl TryFrom<LineItemFixture> for LineItem<'_> {
    type Error = FixtureError;

    fn try_from(fixture: LineItemFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        Ok(LineItem::new(
            fixture.name,
            Money::from_minor(minor_units, currency),
            fixture.quantity,
        ))
    }
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        "INR" => INR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}
