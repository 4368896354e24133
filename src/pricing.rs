//! Pricing
//!
//! Discounts are computed in minor units and rounded half away from zero
//! (half-up for prices). An order is discounted once on its subtotal and the
//! discount is then split across the lines, so the lines always add up to the
//! discounted order total.

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::resolver::EffectiveOffer;

/// Errors specific to discount calculations.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not representable")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Price `amount` under `offer`.
///
/// Without an offer the amount is returned unchanged.
///
/// # Errors
///
/// Returns an error if the discount cannot be represented in minor units.
pub fn apply_discount<'a>(
    amount: Money<'a, Currency>,
    offer: Option<&EffectiveOffer<'_>>,
) -> Result<Money<'a, Currency>, DiscountError> {
    let Some(offer) = offer else {
        return Ok(amount);
    };

    let discount = discount_on(&amount, offer.effective_percentage)?;

    Ok(amount.sub(discount)?)
}

/// The amount taken off `price` by a discount of `percentage` points.
///
/// # Errors
///
/// Returns an error if the discount cannot be represented in minor units.
pub fn discount_on<'a>(
    price: &Money<'a, Currency>,
    percentage: Decimal,
) -> Result<Money<'a, Currency>, DiscountError> {
    let discount_minor = percent_of_minor(percentage, price.to_minor_units())?;

    Ok(Money::from_minor(discount_minor, price.currency()))
}

/// Calculate `percentage` points of a minor unit amount, rounded half away from zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the result overflows.
pub fn percent_of_minor(percentage: Decimal, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    minor
        .checked_mul(percentage)
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Split `discount` across `parts` in proportion to each part.
///
/// Each share is floored, then the minor units left over go one each to the
/// parts with the largest remainders (earlier parts first on equal
/// remainders). The shares always sum to `discount`.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if a share does not fit in minor units.
pub fn allocate_discount(
    discount: i64,
    parts: &[i64],
) -> Result<SmallVec<[i64; 8]>, DiscountError> {
    let denom: i128 = parts.iter().copied().map(i128::from).sum();

    if denom == 0 {
        return Ok(parts.iter().map(|_| 0).collect());
    }

    // Keep the divisor positive so floor division behaves.
    let (sign, denom) = if denom < 0 { (-1, -denom) } else { (1, denom) };
    let discount = i128::from(discount);

    let mut shares: SmallVec<[i128; 8]> = SmallVec::with_capacity(parts.len());
    let mut remainders: SmallVec<[(i128, usize); 8]> = SmallVec::with_capacity(parts.len());

    for (index, part) in parts.iter().enumerate() {
        let numerator = sign * discount * i128::from(*part);

        shares.push(numerator.div_euclid(denom));
        remainders.push((numerator.rem_euclid(denom), index));
    }

    let leftover = discount - shares.iter().sum::<i128>();

    remainders.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    for &(_, index) in remainders
        .iter()
        .take(usize::try_from(leftover).unwrap_or(0))
    {
        if let Some(share) = shares.get_mut(index) {
            *share += 1;
        }
    }

    shares
        .into_iter()
        .map(|share| i64::try_from(share).map_err(|_err| DiscountError::PercentConversion))
        .collect()
}
