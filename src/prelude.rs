//! Flashsale prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    countdown::{Countdown, describe_phase_countdown},
    fixtures::{Fixture, FixtureError},
    instants::{Clock, ManualClock, SystemClock},
    orders::{LineItem, Order, OrderError, OrderQuote, QuotedLine, quote_order},
    pricing::{DiscountError, apply_discount},
    promotions::{
        DynamicPricing, PromotionDefinition,
        catalog::{CatalogError, PromotionCatalog, PromotionDraft},
        phase::{Phase, PhaseEvaluation, evaluate},
        validation::{PromotionError, ValidatedPromotion, validate},
    },
    receipt::{Receipt, ReceiptError},
    resolver::{CampaignStatus, EffectiveOffer, campaign_overview, resolve},
    ticker::{OfferSnapshot, OfferTicker, TickOutcome},
};
