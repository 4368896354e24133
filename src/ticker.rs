//! Offer ticker
//!
//! Storefronts refresh the applied offer on a timer. The ticker owns the
//! clock and keeps only the latest resolved offer; all the time math stays in
//! the stateless resolver, so a missed or late tick can never leave the
//! stored offer out of step with the clock.

use jiff::Timestamp;
use rust_decimal::Decimal;
use tracing::info;

use crate::{
    instants::Clock,
    promotions::{PromotionDefinition, phase::Phase},
    resolver::{EffectiveOffer, resolve},
};

/// Owned copy of a resolved offer, kept between ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferSnapshot {
    /// The winning campaign as it was when resolved
    pub promotion: PromotionDefinition,

    /// Discount in percentage points
    pub effective_percentage: Decimal,

    /// Phase of the winning campaign
    pub phase: Phase,

    /// Instant the offer was resolved at
    pub resolved_at: Timestamp,
}

impl OfferSnapshot {
    fn capture(offer: &EffectiveOffer<'_>, resolved_at: Timestamp) -> Self {
        Self {
            promotion: offer.promotion.clone(),
            effective_percentage: offer.effective_percentage,
            phase: offer.phase,
            resolved_at,
        }
    }

    /// Borrow the snapshot as an offer for pricing.
    pub fn as_offer(&self) -> EffectiveOffer<'_> {
        EffectiveOffer {
            promotion: &self.promotion,
            effective_percentage: self.effective_percentage,
            phase: self.phase,
        }
    }

    fn same_offer(&self, other: &Self) -> bool {
        self.promotion.id == other.promotion.id
            && self.effective_percentage == other.effective_percentage
            && self.phase == other.phase
    }
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The applied offer is unchanged.
    Unchanged,

    /// The applied offer changed (including to or from no offer).
    Changed,
}

/// Periodic re-resolution driven by a caller-owned clock.
#[derive(Debug)]
pub struct OfferTicker<C: Clock> {
    clock: C,
    latest: Option<OfferSnapshot>,
    last_tick: Option<Timestamp>,
}

impl<C: Clock> OfferTicker<C> {
    /// Create a ticker that has not ticked yet.
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            latest: None,
            last_tick: None,
        }
    }

    /// Sample the clock and re-resolve against `promotions`.
    pub fn tick(&mut self, promotions: &[PromotionDefinition]) -> TickOutcome {
        let now = self.clock.now();
        let next = resolve(promotions, now).map(|offer| OfferSnapshot::capture(&offer, now));

        let changed = match (&self.latest, &next) {
            (Some(previous), Some(next)) => !previous.same_offer(next),
            (None, None) => false,
            _ => true,
        };

        if changed {
            match &next {
                Some(offer) => info!(
                    promotion = %offer.promotion.id,
                    percentage = %offer.effective_percentage,
                    phase = %offer.phase,
                    "applied offer changed"
                ),
                None => info!("no offer applies"),
            }
        }

        self.latest = next;
        self.last_tick = Some(now);

        if changed {
            TickOutcome::Changed
        } else {
            TickOutcome::Unchanged
        }
    }

    /// The offer stored by the latest tick.
    pub fn latest(&self) -> Option<&OfferSnapshot> {
        self.latest.as_ref()
    }

    /// Instant of the latest tick.
    pub fn last_tick(&self) -> Option<Timestamp> {
        self.last_tick
    }

    /// The ticker's clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}
