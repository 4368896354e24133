//! Promotions
//!
//! A [`PromotionDefinition`] is a time-bounded marketing campaign: a flat
//! percentage off every priceable order between `starts_at` and `ends_at`,
//! optionally followed by a dynamic pricing tail where the discount is clawed
//! back in discrete steps.

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;

pub mod catalog;
pub mod phase;
pub mod validation;

/// Post-expiry decay schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicPricing {
    /// Length of each decay step, in whole minutes.
    pub interval_minutes: i64,

    /// Percentage points removed from the discount per elapsed step.
    pub step_percentage: Decimal,
}

impl DynamicPricing {
    /// Create a decay schedule.
    pub const fn new(interval_minutes: i64, step_percentage: Decimal) -> Self {
        Self {
            interval_minutes,
            step_percentage,
        }
    }
}

impl fmt::Display for DynamicPricing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reduces discount {}% every {} min after end time",
            self.step_percentage.normalize(),
            self.interval_minutes
        )
    }
}

/// A configured campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionDefinition {
    /// Opaque unique identifier
    pub id: String,

    /// Headline shown on the banner
    pub title: String,

    /// Secondary banner text
    pub subtitle: String,

    /// Banner image reference
    pub image: String,

    /// Nominal discount in percentage points, `(0, 100]`
    pub base_percentage: Decimal,

    /// Instant the campaign becomes eligible (inclusive)
    pub starts_at: Timestamp,

    /// Instant the nominal run ends (inclusive)
    pub ends_at: Timestamp,

    /// Decay schedule applied after `ends_at`, if any
    pub dynamic_pricing: Option<DynamicPricing>,
}

impl PromotionDefinition {
    /// Create a campaign without display text or dynamic pricing.
    pub fn new(
        id: impl Into<String>,
        base_percentage: Decimal,
        starts_at: Timestamp,
        ends_at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            subtitle: String::new(),
            image: String::new(),
            base_percentage,
            starts_at,
            ends_at,
            dynamic_pricing: None,
        }
    }

    /// Set the banner text.
    #[must_use]
    pub fn with_display(
        mut self,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        self.title = title.into();
        self.subtitle = subtitle.into();
        self.image = image.into();
        self
    }

    /// Enable dynamic pricing after `ends_at`.
    #[must_use]
    pub fn with_dynamic_pricing(mut self, interval_minutes: i64, step_percentage: Decimal) -> Self {
        self.dynamic_pricing = Some(DynamicPricing::new(interval_minutes, step_percentage));
        self
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn builder_sets_display_and_decay() -> TestResult {
        let start: Timestamp = "2026-10-16T12:00:00Z".parse()?;
        let end: Timestamp = "2026-10-16T14:00:00Z".parse()?;

        let promotion = PromotionDefinition::new("promo-1", Decimal::from(20), start, end)
            .with_display("Happy Hour Special", "Get 20% off all orders", "banner.png")
            .with_dynamic_pricing(10, Decimal::from(5));

        assert_eq!(promotion.title, "Happy Hour Special");
        assert_eq!(
            promotion.dynamic_pricing,
            Some(DynamicPricing::new(10, Decimal::from(5)))
        );

        Ok(())
    }

    #[test]
    fn dynamic_pricing_describes_itself() {
        let decay = DynamicPricing::new(10, Decimal::new(50, 1));

        assert_eq!(
            decay.to_string(),
            "reduces discount 5% every 10 min after end time"
        );
    }
}
