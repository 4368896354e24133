//! Orders
//!
//! An order is a list of line items in one currency. Quoting an order applies
//! the resolved offer to the subtotal once, then splits the discount across
//! the lines, so the discounted lines always sum to the order total.

use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    pricing::{DiscountError, allocate_discount, apply_discount},
    resolver::EffectiveOffer,
};

/// Errors related to order construction or quoting.
#[derive(Debug, Error)]
pub enum OrderError {
    /// A line's currency differs from the order currency (index, line currency, order currency).
    #[error("Line {0} has currency {1}, but order has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A line total does not fit in minor units.
    #[error("Line {0} total overflowed")]
    Overflow(usize),

    /// Discount calculation failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// One menu item in an order.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem<'a> {
    /// Menu item name
    pub name: String,

    /// Price of one unit
    pub unit_price: Money<'a, Currency>,

    /// Units ordered
    pub quantity: u32,
}

impl<'a> LineItem<'a> {
    /// Create a line item.
    pub fn new(name: impl Into<String>, unit_price: Money<'a, Currency>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    /// Undiscounted line total.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Overflow`] if the total does not fit in minor units.
    fn total(&self, index: usize) -> Result<Money<'a, Currency>, OrderError> {
        let minor = self
            .unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
            .ok_or(OrderError::Overflow(index))?;

        Ok(Money::from_minor(minor, self.unit_price.currency()))
    }
}

/// Order
#[derive(Debug, Clone)]
pub struct Order<'a> {
    lines: Vec<LineItem<'a>>,
    currency: &'static Currency,
}

impl<'a> Order<'a> {
    /// Create an empty order.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            lines: Vec::new(),
            currency,
        }
    }

    /// Create an order with the given lines.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::CurrencyMismatch`] if a line is priced in another currency.
    pub fn with_lines(
        lines: impl Into<Vec<LineItem<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, OrderError> {
        let lines = lines.into();

        lines.iter().enumerate().try_for_each(|(i, line)| {
            let line_currency = line.unit_price.currency();

            if line_currency == currency {
                Ok(())
            } else {
                Err(OrderError::CurrencyMismatch(
                    i,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ))
            }
        })?;

        Ok(Self { lines, currency })
    }

    /// Line items in order.
    pub fn lines(&self) -> &[LineItem<'a>] {
        &self.lines
    }

    /// Order currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Number of units across all lines.
    pub fn unit_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Whether the order has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A priced line.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotedLine<'a> {
    /// Menu item name
    pub name: String,

    /// Units ordered
    pub quantity: u32,

    /// Price of one unit
    pub unit_price: Money<'a, Currency>,

    /// Undiscounted line total
    pub total: Money<'a, Currency>,

    /// Line total after the offer
    pub discounted_total: Money<'a, Currency>,
}

/// A fully priced order.
#[derive(Debug, Clone)]
pub struct OrderQuote<'a> {
    lines: SmallVec<[QuotedLine<'a>; 8]>,
    subtotal: Money<'a, Currency>,
    total: Money<'a, Currency>,
    units: u64,
    offer_title: Option<String>,
    percentage: Option<Decimal>,
}

impl<'a> OrderQuote<'a> {
    /// Priced lines.
    pub fn lines(&self) -> &[QuotedLine<'a>] {
        &self.lines
    }

    /// Total before discount.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Total after discount.
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Amount saved.
    ///
    /// # Errors
    ///
    /// Returns a `MoneyError` on arithmetic failure.
    pub fn discount(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.subtotal.sub(self.total)
    }

    /// Number of units across all lines.
    pub fn unit_count(&self) -> u64 {
        self.units
    }

    /// Title of the applied campaign, if any.
    pub fn offer_title(&self) -> Option<&str> {
        self.offer_title.as_deref()
    }

    /// Applied discount in percentage points, if any.
    pub fn percentage(&self) -> Option<Decimal> {
        self.percentage
    }
}

/// Price an order under the resolved offer.
///
/// The discount is taken off the subtotal with the same rounding as
/// [`apply_discount`] and allocated to the lines in proportion to their totals.
///
/// # Errors
///
/// Returns an error if a line total overflows or money arithmetic fails.
pub fn quote_order<'a>(
    order: &Order<'a>,
    offer: Option<&EffectiveOffer<'_>>,
) -> Result<OrderQuote<'a>, OrderError> {
    let currency = order.currency();
    let mut subtotal = Money::from_minor(0, currency);
    let mut line_totals: SmallVec<[Money<'a, Currency>; 8]> =
        SmallVec::with_capacity(order.lines().len());

    for (index, line) in order.lines().iter().enumerate() {
        let line_total = line.total(index)?;

        subtotal = subtotal.add(line_total)?;
        line_totals.push(line_total);
    }

    let total = apply_discount(subtotal, offer)?;
    let discount = subtotal.sub(total)?;

    let minor_totals: SmallVec<[i64; 8]> =
        line_totals.iter().map(Money::to_minor_units).collect();
    let shares = allocate_discount(discount.to_minor_units(), &minor_totals)?;

    let mut lines = SmallVec::with_capacity(line_totals.len());

    for ((line, line_total), share) in order.lines().iter().zip(line_totals).zip(shares) {
        lines.push(QuotedLine {
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            total: line_total,
            discounted_total: line_total.sub(Money::from_minor(share, currency))?,
        });
    }

    Ok(OrderQuote {
        lines,
        subtotal,
        total,
        units: order.unit_count(),
        offer_title: offer.map(|offer| offer.promotion.title.clone()),
        percentage: offer.map(|offer| offer.effective_percentage),
    })
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::promotions::{PromotionDefinition, phase::Phase};

    use super::*;

    fn promotion(percentage: i64) -> Result<PromotionDefinition, jiff::Error> {
        Ok(PromotionDefinition::new(
            "promo",
            Decimal::from(percentage),
            "2026-10-16T12:00:00Z".parse::<Timestamp>()?,
            "2026-10-16T14:00:00Z".parse::<Timestamp>()?,
        )
        .with_display("Happy Hour Special", "", ""))
    }

    fn offer(promotion: &PromotionDefinition) -> EffectiveOffer<'_> {
        EffectiveOffer {
            promotion,
            effective_percentage: promotion.base_percentage,
            phase: Phase::Active,
        }
    }

    fn lunch<'a>() -> [LineItem<'a>; 2] {
        [
            LineItem::new("Truffle Macchiato", Money::from_minor(1_225, USD), 2),
            LineItem::new("Double Cheeseburger", Money::from_minor(1_599, USD), 1),
        ]
    }

    #[test]
    fn with_lines_currency_mismatch_errors() {
        let lines = [
            LineItem::new("Tea", Money::from_minor(100, USD), 1),
            LineItem::new("Scone", Money::from_minor(100, GBP), 1),
        ];

        match Order::with_lines(lines, USD) {
            Err(OrderError::CurrencyMismatch(idx, line_currency, order_currency)) => {
                assert_eq!(idx, 1);
                assert_eq!(line_currency, GBP.iso_alpha_code);
                assert_eq!(order_currency, USD.iso_alpha_code);
            }
            other => panic!("expected CurrencyMismatch error, got {other:?}"),
        }
    }

    #[test]
    fn quote_without_offer_is_full_price() -> TestResult {
        let order = Order::with_lines(lunch(), USD)?;
        let quote = quote_order(&order, None)?;

        assert_eq!(quote.subtotal(), Money::from_minor(4_049, USD));
        assert_eq!(quote.total(), Money::from_minor(4_049, USD));
        assert_eq!(quote.discount()?, Money::from_minor(0, USD));
        assert_eq!(quote.offer_title(), None);

        Ok(())
    }

    #[test]
    fn quote_discounts_each_line() -> TestResult {
        let promotion = promotion(20)?;
        let order = Order::with_lines(lunch(), USD)?;
        let quote = quote_order(&order, Some(&offer(&promotion)))?;

        let discounted: Vec<i64> = quote
            .lines()
            .iter()
            .map(|line| line.discounted_total.to_minor_units())
            .collect();

        // 809.8 off 4049 rounds to 810, split 490 / 320
        assert_eq!(discounted, [1_960, 1_279]);
        assert_eq!(quote.total(), Money::from_minor(3_239, USD));
        assert_eq!(quote.discount()?, Money::from_minor(810, USD));
        assert_eq!(quote.offer_title(), Some("Happy Hour Special"));
        assert_eq!(quote.percentage(), Some(Decimal::from(20)));

        Ok(())
    }

    #[test]
    fn sum_of_lines_matches_discounted_subtotal_within_a_cent() -> TestResult {
        let promotion = promotion(10)?;
        let offer = offer(&promotion);

        let order = Order::with_lines(
            [
                LineItem::new("Flat White Deluxe", Money::from_minor(3_333, USD), 1),
                LineItem::new("Quinoa Power Bowl", Money::from_minor(1_425, USD), 1),
            ],
            USD,
        )?;

        let quote = quote_order(&order, Some(&offer))?;
        let whole = apply_discount(quote.subtotal(), Some(&offer))?;

        let drift = (quote.total().to_minor_units() - whole.to_minor_units()).abs();

        assert!(drift <= 1, "drift of {drift} minor units");

        Ok(())
    }

    #[test]
    fn many_midpoint_lines_do_not_accumulate_rounding() -> TestResult {
        let promotion = promotion(10)?;
        let offer = offer(&promotion);

        // Each 5 cent line alone would round its 0.5 cent discount up.
        let lines: Vec<LineItem<'_>> = ["Mint", "Toffee", "Fudge", "Nougat", "Praline", "Truffle"]
            .into_iter()
            .map(|name| LineItem::new(name, Money::from_minor(5, USD), 1))
            .collect();

        let order = Order::with_lines(lines, USD)?;
        let quote = quote_order(&order, Some(&offer))?;
        let whole = apply_discount(quote.subtotal(), Some(&offer))?;

        let line_sum: i64 = quote
            .lines()
            .iter()
            .map(|line| line.discounted_total.to_minor_units())
            .sum();

        assert_eq!(whole, Money::from_minor(27, USD));
        assert_eq!(quote.total(), whole);
        assert_eq!(line_sum, 27);
        assert_eq!(quote.discount()?, Money::from_minor(3, USD));

        Ok(())
    }

    #[test]
    fn empty_order_quotes_zero() -> TestResult {
        let order = Order::new(GBP);
        let quote = quote_order(&order, None)?;

        assert!(order.is_empty());
        assert_eq!(quote.total(), Money::from_minor(0, GBP));

        Ok(())
    }

    #[test]
    fn overflowing_line_is_reported() -> TestResult {
        let order = Order::with_lines(
            [LineItem::new("Gold", Money::from_minor(i64::MAX, USD), 2)],
            USD,
        )?;

        assert!(matches!(
            quote_order(&order, None),
            Err(OrderError::Overflow(0))
        ));

        Ok(())
    }

    #[test]
    fn unit_count_sums_quantities() -> TestResult {
        let order = Order::with_lines(lunch(), USD)?;

        assert_eq!(order.unit_count(), 3);
        assert_eq!(quote_order(&order, None)?.unit_count(), 3);

        Ok(())
    }
}
