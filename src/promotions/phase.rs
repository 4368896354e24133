//! Promotion phases
//!
//! [`evaluate`] is the only place campaign time math happens. Both offer
//! resolution and countdown display go through it, so the discount applied
//! to an order always matches what the banner showed at the same instant.

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::{
    instants::{add_minutes, whole_minutes_between},
    promotions::validation::ValidatedPromotion,
};

/// Where a campaign is in its lifecycle at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Not started yet.
    Upcoming,

    /// Between start and nominal end, inclusive.
    Active,

    /// Past the nominal end, with dynamic pricing still leaving some discount.
    Decaying,

    /// No discount left.
    Expired,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Upcoming => "Upcoming",
            Phase::Active => "Active",
            Phase::Decaying => "Dynamic pricing",
            Phase::Expired => "Expired",
        };

        f.write_str(label)
    }
}

/// A campaign's state at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseEvaluation {
    /// Lifecycle phase
    pub phase: Phase,

    /// Discount in percentage points, never negative
    pub effective_percentage: Decimal,

    /// Decay steps elapsed since the nominal end (zero before it)
    pub steps_elapsed: i64,

    /// Next instant at which the phase or percentage changes
    pub next_transition: Option<Timestamp>,
}

/// Compute a validated campaign's phase and effective discount at `now`.
pub fn evaluate(validated: &ValidatedPromotion<'_>, now: Timestamp) -> PhaseEvaluation {
    let promotion = validated.promotion();

    if now < promotion.starts_at {
        return PhaseEvaluation {
            phase: Phase::Upcoming,
            effective_percentage: Decimal::ZERO,
            steps_elapsed: 0,
            next_transition: Some(promotion.starts_at),
        };
    }

    if now <= promotion.ends_at {
        return PhaseEvaluation {
            phase: Phase::Active,
            effective_percentage: promotion.base_percentage,
            steps_elapsed: 0,
            next_transition: Some(promotion.ends_at),
        };
    }

    let Some(decay) = validated.decay() else {
        return expired(0);
    };

    let minutes_over = whole_minutes_between(promotion.ends_at, now);
    let steps_elapsed = minutes_over / decay.interval_minutes;

    let effective_percentage = Decimal::from(steps_elapsed)
        .checked_mul(decay.step_percentage)
        .map_or(Decimal::ZERO, |reduction| {
            (promotion.base_percentage - reduction).max(Decimal::ZERO)
        });

    if effective_percentage <= Decimal::ZERO {
        return expired(steps_elapsed);
    }

    let next_step_minutes = steps_elapsed
        .saturating_add(1)
        .saturating_mul(decay.interval_minutes);

    PhaseEvaluation {
        phase: Phase::Decaying,
        effective_percentage,
        steps_elapsed,
        next_transition: Some(add_minutes(promotion.ends_at, next_step_minutes)),
    }
}

fn expired(steps_elapsed: i64) -> PhaseEvaluation {
    PhaseEvaluation {
        phase: Phase::Expired,
        effective_percentage: Decimal::ZERO,
        steps_elapsed,
        next_transition: None,
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use testresult::TestResult;

    use crate::promotions::{PromotionDefinition, validation::validate};

    use super::*;

    const T0: &str = "2026-10-16T12:00:00Z";

    fn t0() -> Result<Timestamp, jiff::Error> {
        T0.parse()
    }

    fn after(minutes: i64, seconds: i64) -> Result<Timestamp, jiff::Error> {
        t0()?.checked_add(SignedDuration::from_secs(minutes * 60 + seconds))
    }

    fn decaying() -> Result<PromotionDefinition, jiff::Error> {
        Ok(PromotionDefinition::new(
            "decaying",
            Decimal::from(20),
            "2026-10-16T10:00:00Z".parse()?,
            t0()?,
        )
        .with_dynamic_pricing(10, Decimal::from(5)))
    }

    #[test]
    fn upcoming_before_start_and_active_at_start() -> TestResult {
        let promotion = PromotionDefinition::new("p", Decimal::from(20), t0()?, after(120, 0)?);
        let validated = validate(&promotion)?;

        let before = evaluate(&validated, after(-1, 0)?);
        let at_start = evaluate(&validated, t0()?);

        assert_eq!(before.phase, Phase::Upcoming);
        assert_eq!(before.effective_percentage, Decimal::ZERO);
        assert_eq!(before.next_transition, Some(t0()?));

        assert_eq!(at_start.phase, Phase::Active);
        assert_eq!(at_start.effective_percentage, Decimal::from(20));
        assert_eq!(at_start.next_transition, Some(after(120, 0)?));

        Ok(())
    }

    #[test]
    fn hard_cutoff_after_end_without_decay() -> TestResult {
        let promotion = PromotionDefinition::new("p", Decimal::from(20), t0()?, after(120, 0)?);
        let validated = validate(&promotion)?;

        let at_end = evaluate(&validated, after(120, 0)?);
        let just_after = evaluate(&validated, after(120, 1)?);

        assert_eq!(at_end.phase, Phase::Active);
        assert_eq!(at_end.effective_percentage, Decimal::from(20));
        assert_eq!(just_after.phase, Phase::Expired);
        assert_eq!(just_after.effective_percentage, Decimal::ZERO);
        assert_eq!(just_after.next_transition, None);

        Ok(())
    }

    #[test]
    fn first_decay_interval_keeps_base_percentage() -> TestResult {
        let promotion = decaying()?;
        let validated = validate(&promotion)?;

        let evaluation = evaluate(&validated, after(9, 59)?);

        assert_eq!(evaluation.phase, Phase::Decaying);
        assert_eq!(evaluation.effective_percentage, Decimal::from(20));
        assert_eq!(evaluation.steps_elapsed, 0);
        assert_eq!(evaluation.next_transition, Some(after(10, 0)?));

        Ok(())
    }

    #[test]
    fn decays_in_whole_steps() -> TestResult {
        let promotion = decaying()?;
        let validated = validate(&promotion)?;

        let evaluation = evaluate(&validated, after(25, 0)?);

        assert_eq!(evaluation.phase, Phase::Decaying);
        assert_eq!(evaluation.steps_elapsed, 2);
        assert_eq!(evaluation.effective_percentage, Decimal::from(10));
        assert_eq!(evaluation.next_transition, Some(after(30, 0)?));

        Ok(())
    }

    #[test]
    fn fully_decayed_is_expired() -> TestResult {
        let promotion = decaying()?;
        let validated = validate(&promotion)?;

        let evaluation = evaluate(&validated, after(41, 0)?);

        assert_eq!(evaluation.phase, Phase::Expired);
        assert_eq!(evaluation.effective_percentage, Decimal::ZERO);
        assert_eq!(evaluation.steps_elapsed, 4);

        Ok(())
    }

    #[test]
    fn oversized_step_floors_at_zero() -> TestResult {
        let promotion = decaying()?.with_dynamic_pricing(1, Decimal::from(35));
        let validated = validate(&promotion)?;

        let evaluation = evaluate(&validated, after(1, 0)?);

        assert_eq!(evaluation.phase, Phase::Expired);
        assert_eq!(evaluation.effective_percentage, Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn phase_labels() {
        assert_eq!(Phase::Decaying.to_string(), "Dynamic pricing");
        assert_eq!(Phase::Upcoming.to_string(), "Upcoming");
    }
}
