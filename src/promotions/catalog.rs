//! Promotion catalog
//!
//! The ordered, in-memory set of campaigns an admin surface edits. Order is
//! creation order and is what [`crate::resolver::resolve`] uses to break ties.

use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    instants::add_minutes,
    promotions::{
        DynamicPricing, PromotionDefinition,
        validation::{PromotionError, problems},
    },
};

/// Default nominal run of a new campaign, in minutes.
pub const DEFAULT_RUN_MINUTES: i64 = 120;

/// Default discount of a new campaign, in percentage points.
pub const DEFAULT_PERCENTAGE: i64 = 20;

/// Default decay interval offered when dynamic pricing is switched on.
pub const DEFAULT_DECAY_INTERVAL_MINUTES: i64 = 10;

/// Default decay step offered when dynamic pricing is switched on.
pub const DEFAULT_DECAY_STEP: i64 = 5;

/// Catalog errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// A promotion with this id already exists.
    #[error("promotion {0} already exists")]
    DuplicateId(String),

    /// No promotion with this id.
    #[error("promotion {0} not found")]
    NotFound(String),

    /// The definition failed validation.
    #[error(transparent)]
    Invalid(#[from] PromotionError),
}

/// Editable form of a campaign before it is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionDraft {
    /// Headline
    pub title: String,

    /// Secondary text
    pub subtitle: String,

    /// Banner image
    pub image: String,

    /// Discount in percentage points
    pub percentage: Decimal,

    /// Start instant
    pub starts_at: Timestamp,

    /// Nominal end instant
    pub ends_at: Timestamp,

    /// Whether the decay schedule below is applied
    pub dynamic_pricing: bool,

    /// Decay schedule, kept even while switched off so toggling keeps the values
    pub decay: DynamicPricing,
}

impl PromotionDraft {
    /// A fresh draft: 20% off, starting `now`, running two hours.
    pub fn starting_at(now: Timestamp) -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            image: String::new(),
            percentage: Decimal::from(DEFAULT_PERCENTAGE),
            starts_at: now,
            ends_at: add_minutes(now, DEFAULT_RUN_MINUTES),
            dynamic_pricing: false,
            decay: DynamicPricing::new(
                DEFAULT_DECAY_INTERVAL_MINUTES,
                Decimal::from(DEFAULT_DECAY_STEP),
            ),
        }
    }

    /// Draft pre-filled from an existing definition.
    pub fn from_definition(promotion: &PromotionDefinition) -> Self {
        let mut draft = Self::starting_at(promotion.starts_at);

        draft.title.clone_from(&promotion.title);
        draft.subtitle.clone_from(&promotion.subtitle);
        draft.image.clone_from(&promotion.image);
        draft.percentage = promotion.base_percentage;
        draft.ends_at = promotion.ends_at;

        if let Some(decay) = promotion.dynamic_pricing {
            draft.dynamic_pricing = true;
            draft.decay = decay;
        }

        draft
    }

    fn into_definition(self, id: String) -> PromotionDefinition {
        PromotionDefinition {
            id,
            title: self.title,
            subtitle: self.subtitle,
            image: self.image,
            base_percentage: self.percentage,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            dynamic_pricing: self.dynamic_pricing.then_some(self.decay),
        }
    }
}

/// Ordered collection of campaigns.
#[derive(Debug, Default, Clone)]
pub struct PromotionCatalog {
    promotions: Vec<PromotionDefinition>,
}

impl PromotionCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from definitions, keeping their order.
    ///
    /// Definitions with problems are kept, since resolution skips or degrades
    /// them on its own, but each problem is logged once here.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if two definitions share an id.
    pub fn from_definitions(
        promotions: impl IntoIterator<Item = PromotionDefinition>,
    ) -> Result<Self, CatalogError> {
        let promotions: Vec<_> = promotions.into_iter().collect();
        let mut seen = FxHashSet::default();

        for promotion in &promotions {
            if !seen.insert(promotion.id.as_str()) {
                return Err(CatalogError::DuplicateId(promotion.id.clone()));
            }

            for problem in problems(promotion) {
                warn!(promotion = %promotion.id, %problem, "promotion misconfigured");
            }
        }

        Ok(Self { promotions })
    }

    /// Save a draft as a new campaign at the end of the catalog, returning
    /// its position (and so its tie-break rank).
    ///
    /// # Errors
    ///
    /// Returns an error if the id is taken or the draft fails validation.
    pub fn create(
        &mut self,
        id: impl Into<String>,
        draft: PromotionDraft,
    ) -> Result<usize, CatalogError> {
        let id = id.into();

        if self.position(&id).is_some() {
            return Err(CatalogError::DuplicateId(id));
        }

        let promotion = checked(draft.into_definition(id))?;

        info!(promotion = %promotion.id, "promotion created");

        let position = self.promotions.len();
        self.promotions.push(promotion);

        Ok(position)
    }

    /// Replace an existing campaign in place, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown or the draft fails validation.
    pub fn update(
        &mut self,
        id: &str,
        draft: PromotionDraft,
    ) -> Result<&PromotionDefinition, CatalogError> {
        let slot = self
            .promotions
            .iter_mut()
            .find(|promotion| promotion.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        *slot = checked(draft.into_definition(id.to_string()))?;

        info!(promotion = %id, "promotion updated");

        Ok(slot)
    }

    /// Remove a campaign, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the id is unknown.
    pub fn remove(&mut self, id: &str) -> Result<PromotionDefinition, CatalogError> {
        let index = self
            .position(id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        info!(promotion = %id, "promotion removed");

        Ok(self.promotions.remove(index))
    }

    /// Look up a campaign by id.
    pub fn get(&self, id: &str) -> Option<&PromotionDefinition> {
        self.promotions.iter().find(|promotion| promotion.id == id)
    }

    /// Read-only snapshot in catalog order.
    pub fn as_slice(&self) -> &[PromotionDefinition] {
        &self.promotions
    }

    /// Number of campaigns.
    pub fn len(&self) -> usize {
        self.promotions.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.promotions.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.promotions
            .iter()
            .position(|promotion| promotion.id == id)
    }
}

fn checked(promotion: PromotionDefinition) -> Result<PromotionDefinition, CatalogError> {
    match problems(&promotion).into_iter().next() {
        Some(problem) => Err(problem.into()),
        None => Ok(promotion),
    }
}
