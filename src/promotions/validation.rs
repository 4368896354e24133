//! Promotion validation
//!
//! Malformed campaigns are filtered out one at a time so that a single bad
//! record never blocks resolution of the rest of the set.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::promotions::{DynamicPricing, PromotionDefinition};

/// Reasons a promotion definition is unusable as configured.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PromotionError {
    /// `ends_at` is not strictly after `starts_at`.
    #[error("promotion {0} ends at or before it starts")]
    InvalidRange(String),

    /// `base_percentage` is outside `(0, 100]`.
    #[error("promotion {0} has discount {1}%, expected a value in (0, 100]")]
    InvalidPercentage(String, Decimal),

    /// Dynamic pricing is on but the interval or step is not positive.
    #[error("promotion {0} has a non-positive decay interval or step")]
    InvalidDecayConfig(String),

    /// The campaign has no title.
    #[error("promotion {0} has no title")]
    MissingTitle(String),
}

/// A promotion that passed validation, with its usable decay schedule.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedPromotion<'a> {
    promotion: &'a PromotionDefinition,
    decay: Option<DynamicPricing>,
}

impl<'a> ValidatedPromotion<'a> {
    /// The underlying definition.
    pub fn promotion(&self) -> &'a PromotionDefinition {
        self.promotion
    }

    /// The decay schedule to apply, `None` when dynamic pricing is off or
    /// misconfigured.
    pub fn decay(&self) -> Option<DynamicPricing> {
        self.decay
    }
}

/// Validate a promotion for resolution.
///
/// A misconfigured decay schedule does not reject the promotion: it fails
/// open to a plain hard cutoff at `ends_at`, logged at `debug`. Catalogs warn
/// once when they are built.
///
/// # Errors
///
/// - [`PromotionError::InvalidRange`]: `ends_at <= starts_at`.
/// - [`PromotionError::InvalidPercentage`]: `base_percentage` outside `(0, 100]`.
pub fn validate(promotion: &PromotionDefinition) -> Result<ValidatedPromotion<'_>, PromotionError> {
    check_range(promotion)?;
    check_percentage(promotion)?;

    let decay = match check_decay(promotion) {
        Ok(decay) => decay,
        Err(error) => {
            debug!(promotion = %promotion.id, %error, "dynamic pricing disabled");
            None
        }
    };

    Ok(ValidatedPromotion { promotion, decay })
}

/// Report every problem with a definition, as an admin form would.
pub fn problems(promotion: &PromotionDefinition) -> Vec<PromotionError> {
    let mut problems = Vec::new();

    if promotion.title.trim().is_empty() {
        problems.push(PromotionError::MissingTitle(promotion.id.clone()));
    }

    problems.extend(check_range(promotion).err());
    problems.extend(check_percentage(promotion).err());
    problems.extend(check_decay(promotion).err());

    problems
}

fn check_range(promotion: &PromotionDefinition) -> Result<(), PromotionError> {
    if promotion.ends_at <= promotion.starts_at {
        return Err(PromotionError::InvalidRange(promotion.id.clone()));
    }

    Ok(())
}

fn check_percentage(promotion: &PromotionDefinition) -> Result<(), PromotionError> {
    let percentage = promotion.base_percentage;

    if percentage <= Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
        return Err(PromotionError::InvalidPercentage(
            promotion.id.clone(),
            percentage,
        ));
    }

    Ok(())
}

fn check_decay(promotion: &PromotionDefinition) -> Result<Option<DynamicPricing>, PromotionError> {
    let Some(decay) = promotion.dynamic_pricing else {
        return Ok(None);
    };

    if decay.interval_minutes <= 0 || decay.step_percentage <= Decimal::ZERO {
        return Err(PromotionError::InvalidDecayConfig(promotion.id.clone()));
    }

    Ok(Some(decay))
}
