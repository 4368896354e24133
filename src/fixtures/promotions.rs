//! Promotion Fixtures

use jiff::Timestamp;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    promotions::{DynamicPricing, PromotionDefinition},
};

/// Wrapper for promotions in YAML
#[derive(Debug, Deserialize)]
pub struct PromotionsFixture {
    /// Promotions, in priority order for tie-breaks
    pub promotions: Vec<PromotionFixture>,
}

/// Promotion fixture from YAML
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromotionFixture {
    /// Promotion id
    pub id: String,

    /// Banner headline
    pub title: String,

    /// Banner secondary text
    #[serde(default)]
    pub subtitle: String,

    /// Banner image
    #[serde(default)]
    pub image: String,

    /// Discount, e.g. `20%` or `20`
    pub discount: PercentageFixture,

    /// RFC 3339 start instant
    pub starts_at: Timestamp,

    /// RFC 3339 nominal end instant
    pub ends_at: Timestamp,

    /// Optional decay schedule
    #[serde(default)]
    pub dynamic_pricing: Option<DynamicPricingFixture>,
}

/// Decay schedule fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DynamicPricingFixture {
    /// Minutes per decay step
    pub every_minutes: i64,

    /// Percentage points removed per step, e.g. `5%`
    pub step: PercentageFixture,
}

/// A percentage written either as a number or a string, both in percentage points.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PercentageFixture {
    /// Bare number, e.g. `12.5`
    Number(f64),

    /// String, e.g. `"12.5%"`
    Text(String),
}

impl TryFrom<PercentageFixture> for Decimal {
    type Error = FixtureError;

    fn try_from(fixture: PercentageFixture) -> Result<Self, Self::Error> {
        match fixture {
            PercentageFixture::Number(value) => Decimal::from_f64(value)
                .map(|value| value.normalize())
                .ok_or_else(|| FixtureError::InvalidPercentage(value.to_string())),
            PercentageFixture::Text(text) => parse_percentage(&text),
        }
    }
}

impl TryFrom<PromotionFixture> for PromotionDefinition {
    type Error = FixtureError;

    fn try_from(fixture: PromotionFixture) -> Result<Self, Self::Error> {
        let dynamic_pricing = fixture
            .dynamic_pricing
            .map(|decay| -> Result<DynamicPricing, FixtureError> {
                Ok(DynamicPricing::new(
                    decay.every_minutes,
                    Decimal::try_from(decay.step)?,
                ))
            })
            .transpose()?;

        Ok(PromotionDefinition {
            id: fixture.id,
            title: fixture.title,
            subtitle: fixture.subtitle,
            image: fixture.image,
            base_percentage: Decimal::try_from(fixture.discount)?,
            starts_at: fixture.starts_at,
            ends_at: fixture.ends_at,
            dynamic_pricing,
        })
    }
}

/// Parse a percentage string (e.g., "15%" or "15") into percentage points
///
/// # Errors
///
/// Returns an error if the string is not a decimal number with an optional `%` suffix.
pub fn parse_percentage(s: &str) -> Result<Decimal, FixtureError> {
    let trimmed = s.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();

    number
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))
}
