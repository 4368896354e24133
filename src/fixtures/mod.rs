//! Fixtures
//!
//! YAML fixture sets live under `<base>/promotions/NAME.yml` and
//! `<base>/orders/NAME.yml`.

use std::{fs, path::PathBuf};

use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    fixtures::{orders::OrderFixture, promotions::PromotionsFixture},
    orders::{LineItem, Order, OrderError},
    promotions::{
        PromotionDefinition,
        catalog::{CatalogError, PromotionCatalog},
    },
};

pub mod orders;
pub mod promotions;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between order lines
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No order lines loaded yet
    #[error("No order lines loaded yet; currency unknown")]
    NoCurrency,

    /// Promotions could not form a catalog
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Order creation error
    #[error("Failed to create order: {0}")]
    Order(#[from] OrderError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Promotions in file order
    promotions: Vec<PromotionDefinition>,

    /// Order lines in file order
    lines: Vec<LineItem<'a>>,

    /// Currency of the order lines
    currency: Option<&'static Currency>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            promotions: Vec::new(),
            lines: Vec::new(),
            currency: None,
        }
    }

    /// Load promotions from a YAML fixture file, appending them in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_promotions(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self
            .base_path
            .join("promotions")
            .join(format!("{name}.yml"));

        let contents = fs::read_to_string(&file_path)?;
        let fixture: PromotionsFixture = serde_norway::from_str(&contents)?;

        for promotion_fixture in fixture.promotions {
            self.promotions.push(promotion_fixture.try_into()?);
        }

        Ok(self)
    }

    /// Load order lines from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_order(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("orders").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: OrderFixture = serde_norway::from_str(&contents)?;

        for line_fixture in fixture.lines {
            let line: LineItem<'static> = line_fixture.try_into()?;
            let currency = line.unit_price.currency();

            if let Some(existing_currency) = self.currency {
                if existing_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            self.lines.push(line);
        }

        Ok(self)
    }

    /// Load a complete fixture set (promotions and order with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_promotions(name)?.load_order(name)?;

        Ok(fixture)
    }

    /// Get all promotions
    pub fn promotions(&self) -> &[PromotionDefinition] {
        &self.promotions
    }

    /// Build a catalog from the loaded promotions
    ///
    /// # Errors
    ///
    /// Returns an error if two promotions share an id.
    pub fn catalog(&self) -> Result<PromotionCatalog, FixtureError> {
        Ok(PromotionCatalog::from_definitions(
            self.promotions.iter().cloned(),
        )?)
    }

    /// Create an order from the loaded lines
    ///
    /// # Errors
    ///
    /// Returns an error if no lines are loaded.
    pub fn order(&self) -> Result<Order<'a>, FixtureError> {
        let currency = self.currency()?;

        Ok(Order::with_lines(self.lines.clone(), currency)?)
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no order lines have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}
