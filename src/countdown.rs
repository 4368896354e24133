//! Countdowns
//!
//! Banner text for a single campaign: which phase it is in and how long until
//! the next change. Built on [`crate::promotions::phase::evaluate`], so the
//! boundaries are exactly the ones resolution uses.

use std::fmt;

use jiff::{SignedDuration, Timestamp};
use rust_decimal::Decimal;

use crate::{
    instants::span_between,
    promotions::{
        PromotionDefinition,
        phase::{Phase, evaluate},
        validation::{PromotionError, validate},
    },
};

/// Display state for one campaign at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    /// Lifecycle phase
    pub phase: Phase,

    /// Discount in effect, in percentage points
    pub effective_percentage: Decimal,

    /// Time until the next transition; `None` once expired
    pub remaining: Option<SignedDuration>,

    /// Percentage points the next decay step removes, while decaying
    pub next_step: Option<Decimal>,

    /// Discount left after the next decay step, while decaying
    pub next_step_percentage: Option<Decimal>,
}

/// Describe a campaign's phase and countdown at `now`.
///
/// # Errors
///
/// Returns the validation error for malformed campaigns.
pub fn describe_phase_countdown(
    promotion: &PromotionDefinition,
    now: Timestamp,
) -> Result<Countdown, PromotionError> {
    let validated = validate(promotion)?;
    let evaluation = evaluate(&validated, now);

    let remaining = evaluation
        .next_transition
        .map(|at| span_between(now, at).max(SignedDuration::ZERO));

    let (next_step, next_step_percentage) = match (evaluation.phase, validated.decay()) {
        (Phase::Decaying, Some(decay)) => (
            Some(decay.step_percentage),
            Some((evaluation.effective_percentage - decay.step_percentage).max(Decimal::ZERO)),
        ),
        _ => (None, None),
    };

    Ok(Countdown {
        phase: evaluation.phase,
        effective_percentage: evaluation.effective_percentage,
        remaining,
        next_step,
        next_step_percentage,
    })
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.remaining.map_or(0, |remaining| remaining.as_secs());
        let (hours, minutes, seconds) = (total / 3600, total % 3600 / 60, total % 60);

        match self.phase {
            Phase::Upcoming => write!(f, "Starts in {hours}h {minutes}m"),
            Phase::Active => write!(f, "{hours}h {minutes}m {seconds}s left"),
            Phase::Decaying => {
                let step = self.next_step.unwrap_or(Decimal::ZERO).normalize();
                let minutes = total / 60;

                write!(f, "Price +{step}% in {minutes}m {seconds}s")
            }
            Phase::Expired => f.write_str("Expired"),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn at(s: &str) -> Result<Timestamp, jiff::Error> {
        s.parse()
    }

    fn campaign() -> Result<PromotionDefinition, jiff::Error> {
        Ok(PromotionDefinition::new(
            "happy-hour",
            Decimal::from(20),
            at("2026-10-16T12:00:00Z")?,
            at("2026-10-16T14:00:00Z")?,
        )
        .with_dynamic_pricing(10, Decimal::from(5)))
    }

    #[test]
    fn upcoming_counts_down_to_start() -> TestResult {
        let countdown = describe_phase_countdown(&campaign()?, at("2026-10-16T10:29:30Z")?)?;

        assert_eq!(countdown.phase, Phase::Upcoming);
        assert_eq!(countdown.remaining, Some(SignedDuration::from_secs(5430)));
        assert_eq!(countdown.to_string(), "Starts in 1h 30m");

        Ok(())
    }

    #[test]
    fn active_counts_down_to_end() -> TestResult {
        let countdown = describe_phase_countdown(&campaign()?, at("2026-10-16T12:58:55Z")?)?;

        assert_eq!(countdown.phase, Phase::Active);
        assert_eq!(countdown.effective_percentage, Decimal::from(20));
        assert_eq!(countdown.to_string(), "1h 1m 5s left");

        Ok(())
    }

    #[test]
    fn active_at_exact_end_has_nothing_left() -> TestResult {
        let countdown = describe_phase_countdown(&campaign()?, at("2026-10-16T14:00:00Z")?)?;

        assert_eq!(countdown.phase, Phase::Active);
        assert_eq!(countdown.remaining, Some(SignedDuration::ZERO));
        assert_eq!(countdown.to_string(), "0h 0m 0s left");

        Ok(())
    }

    #[test]
    fn decaying_counts_down_to_next_step() -> TestResult {
        let countdown = describe_phase_countdown(&campaign()?, at("2026-10-16T14:25:00Z")?)?;

        assert_eq!(countdown.phase, Phase::Decaying);
        assert_eq!(countdown.effective_percentage, Decimal::from(10));
        assert_eq!(countdown.remaining, Some(SignedDuration::from_mins(5)));
        assert_eq!(countdown.next_step, Some(Decimal::from(5)));
        assert_eq!(countdown.next_step_percentage, Some(Decimal::from(5)));
        assert_eq!(countdown.to_string(), "Price +5% in 5m 0s");

        Ok(())
    }

    #[test]
    fn expired_has_no_countdown() -> TestResult {
        let countdown = describe_phase_countdown(&campaign()?, at("2026-10-16T14:41:00Z")?)?;

        assert_eq!(countdown.phase, Phase::Expired);
        assert_eq!(countdown.remaining, None);
        assert_eq!(countdown.to_string(), "Expired");

        Ok(())
    }

    #[test]
    fn malformed_campaign_is_reported() -> TestResult {
        let mut promotion = campaign()?;
        promotion.base_percentage = Decimal::ZERO;

        assert!(matches!(
            describe_phase_countdown(&promotion, at("2026-10-16T13:00:00Z")?),
            Err(PromotionError::InvalidPercentage(_, _))
        ));

        Ok(())
    }
}
