//! Offer resolution
//!
//! Picks the single best discount in effect at an instant. Resolution is a
//! pure function of the promotion set and the instant: nothing is cached
//! between calls, so re-resolving on a timer and re-resolving at checkout
//! always agree.

use jiff::Timestamp;
use rust_decimal::Decimal;
use tracing::debug;

use crate::promotions::{
    PromotionDefinition,
    phase::{Phase, PhaseEvaluation, evaluate},
    validation::{PromotionError, validate},
};

/// The discount currently in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveOffer<'a> {
    /// The winning campaign, unmodified
    pub promotion: &'a PromotionDefinition,

    /// Discount in percentage points after decay, always `> 0`
    pub effective_percentage: Decimal,

    /// Either [`Phase::Active`] or [`Phase::Decaying`]
    pub phase: Phase,
}

/// Resolve the best offer in effect at `now`.
///
/// Campaigns that have not started, have expired, or are malformed contribute
/// nothing. Among the rest the highest effective percentage wins; when
/// several share it, the one listed first in `promotions` wins.
pub fn resolve(promotions: &[PromotionDefinition], now: Timestamp) -> Option<EffectiveOffer<'_>> {
    let mut best: Option<EffectiveOffer<'_>> = None;

    for promotion in promotions {
        let Some(evaluation) = evaluate_promotion(promotion, now) else {
            continue;
        };

        if evaluation.effective_percentage <= Decimal::ZERO {
            continue;
        }

        // Strictly greater, so the earliest of equal offers is kept.
        if best.is_none_or(|best| evaluation.effective_percentage > best.effective_percentage) {
            best = Some(EffectiveOffer {
                promotion,
                effective_percentage: evaluation.effective_percentage,
                phase: evaluation.phase,
            });
        }
    }

    if let Some(offer) = &best {
        debug!(
            promotion = %offer.promotion.id,
            percentage = %offer.effective_percentage,
            phase = %offer.phase,
            "offer resolved"
        );
    }

    best
}

/// Status of one campaign, as listed on an admin overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignStatus<'a> {
    /// The campaign
    pub promotion: &'a PromotionDefinition,

    /// Phase and discount at the instant, or why the campaign is unusable
    pub evaluation: Result<PhaseEvaluation, PromotionError>,
}

impl CampaignStatus<'_> {
    /// Badge text for the campaign.
    pub fn label(&self) -> String {
        match &self.evaluation {
            Ok(evaluation) => evaluation.phase.to_string(),
            Err(_) => "Invalid".to_string(),
        }
    }
}

/// Evaluate every campaign at `now`, in input order.
pub fn campaign_overview(
    promotions: &[PromotionDefinition],
    now: Timestamp,
) -> Vec<CampaignStatus<'_>> {
    promotions
        .iter()
        .map(|promotion| CampaignStatus {
            promotion,
            evaluation: validate(promotion).map(|validated| evaluate(&validated, now)),
        })
        .collect()
}

fn evaluate_promotion(promotion: &PromotionDefinition, now: Timestamp) -> Option<PhaseEvaluation> {
    match validate(promotion) {
        Ok(validated) => Some(evaluate(&validated, now)),
        Err(error) => {
            debug!(promotion = %promotion.id, %error, "promotion skipped");
            None
        }
    }
}
