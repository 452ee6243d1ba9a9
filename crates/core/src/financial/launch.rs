//! Fixed movements and their launches into financial periods.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use webbudget_shared::types::{CODE_LENGTH, generate_code};

use super::error::FinancialError;
use super::movement::{IDENTIFICATION_MAX_LEN, Movement};
use super::period::FinancialPeriod;
use super::period_movement::PeriodMovement;

/// Whether a fixed movement still launches quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixedMovementState {
    /// Still launching.
    Active,
    /// Every quote was launched.
    Finished,
}

/// A movement that repeats every period, like rent or an installment purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedMovement {
    /// Common movement data.
    #[serde(flatten)]
    pub movement: Movement,
    /// Day the repetitions start; its day of month is the due day.
    pub start_date: NaiveDate,
    /// Number of quotes, `None` when undetermined.
    pub total_quotes: Option<i32>,
    /// Quote number of the first launch.
    pub starting_quote: i32,
    /// Active or finished.
    pub state: FixedMovementState,
    /// Launch automatically when a period opens.
    pub auto_launch: bool,
}

impl FixedMovement {
    /// Creates an active fixed movement with undetermined quotes.
    #[must_use]
    pub fn new(movement: Movement, start_date: NaiveDate) -> Self {
        Self {
            movement,
            start_date,
            total_quotes: None,
            starting_quote: 1,
            state: FixedMovementState::Active,
            auto_launch: false,
        }
    }

    /// Returns true when the number of quotes is not known.
    #[must_use]
    pub fn is_undetermined(&self) -> bool {
        self.total_quotes.is_none()
    }

    /// Returns true once finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == FixedMovementState::Finished
    }

    /// Validates the fixed movement before it is saved.
    ///
    /// # Errors
    ///
    /// Returns the movement's validation errors, or `NonPositiveValue`
    /// for a non-positive quote count or starting quote beyond the total.
    pub fn validate(&self) -> Result<(), FinancialError> {
        self.movement.validate()?;
        if self.starting_quote < 1 {
            return Err(FinancialError::NonPositiveValue);
        }
        if let Some(total) = self.total_quotes
            && (total < 1 || self.starting_quote > total)
        {
            return Err(FinancialError::NonPositiveValue);
        }
        Ok(())
    }

    /// Returns the due date of this movement inside a period.
    ///
    /// Uses the start date's day of month in the period's first month,
    /// falling back to the period end when that day is outside the period.
    #[must_use]
    pub fn due_date_in(&self, period: &FinancialPeriod) -> NaiveDate {
        NaiveDate::from_ymd_opt(
            period.start.year(),
            period.start.month(),
            self.start_date.day(),
        )
        .filter(|date| period.contains(*date))
        .unwrap_or(period.end)
    }
}

/// The launch of one quote of a fixed movement into a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Launch {
    /// Database ID, `None` until saved.
    pub id: Option<Uuid>,
    /// Six character code.
    pub code: String,
    /// Quote launched, `None` for undetermined fixed movements.
    pub quote_number: Option<i32>,
    /// Total quotes of the fixed movement at launch time.
    pub total_quotes: Option<i32>,
    /// Period launched into.
    pub financial_period_id: Uuid,
    /// Source fixed movement.
    pub fixed_movement_id: Uuid,
    /// Period movement created by the launch.
    pub period_movement_id: Option<Uuid>,
}

impl Launch {
    /// Returns true when this launch is the fixed movement's last quote.
    #[must_use]
    pub fn is_last_quote(&self) -> bool {
        matches!((self.total_quotes, self.quote_number), (Some(total), Some(quote)) if total == quote)
    }
}

/// What launching a fixed movement into a period produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    /// The launch record.
    pub launch: Launch,
    /// The open period movement to create.
    pub movement: PeriodMovement,
}

impl LaunchPlan {
    /// Returns true when the fixed movement finishes with this launch.
    #[must_use]
    pub fn finishes(&self) -> bool {
        self.launch.is_last_quote()
    }
}

/// Plans the launch of a fixed movement into a period.
///
/// `launched` is the number of launches made so far and `already_in_period`
/// tells whether one of them belongs to `period`.
///
/// # Errors
///
/// Returns `FixedMovementFinished`, `PeriodClosed` or `AlreadyLaunched`.
pub fn plan_launch(
    fixed_movement_id: Uuid,
    fixed: &FixedMovement,
    period: &FinancialPeriod,
    launched: usize,
    already_in_period: bool,
) -> Result<LaunchPlan, FinancialError> {
    if fixed.is_finished() {
        return Err(FinancialError::FixedMovementFinished);
    }
    period.ensure_open()?;
    if already_in_period {
        return Err(FinancialError::AlreadyLaunched);
    }

    let quote_number = fixed.total_quotes.map(|_| {
        let launched = i32::try_from(launched).unwrap_or(i32::MAX);
        fixed.starting_quote.saturating_add(launched)
    });
    if let (Some(total), Some(quote)) = (fixed.total_quotes, quote_number)
        && quote > total
    {
        return Err(FinancialError::FixedMovementFinished);
    }

    let mut movement = Movement::new(fixed.movement.identification.clone(), fixed.movement.value);
    movement.description.clone_from(&fixed.movement.description);
    movement.contact.clone_from(&fixed.movement.contact);
    movement.add_all(fixed.movement.copy_apportionments());
    if let (Some(total), Some(quote)) = (fixed.total_quotes, quote_number) {
        movement.identification = quote_identification(&movement.identification, quote, total);
    }

    Ok(LaunchPlan {
        launch: Launch {
            id: None,
            code: generate_code(CODE_LENGTH),
            quote_number,
            total_quotes: fixed.total_quotes,
            financial_period_id: period.id,
            fixed_movement_id,
            period_movement_id: None,
        },
        movement: PeriodMovement::new(movement, period.id, fixed.due_date_in(period)),
    })
}

/// Appends `" quote/total"`, shortening the name so the result still fits
/// an identification.
fn quote_identification(identification: &str, quote: i32, total: i32) -> String {
    let suffix = format!(" {quote}/{total}");
    let room = IDENTIFICATION_MAX_LEN.saturating_sub(suffix.chars().count());
    let name: String = identification.trim_end().chars().take(room).collect();
    format!("{}{suffix}", name.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::financial::Apportionment;
    use crate::registration::{CostCenterRef, MovementClassRef, MovementClassType};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn march() -> FinancialPeriod {
        FinancialPeriod {
            id: Uuid::now_v7(),
            identification: "03/2026".to_string(),
            start: date(2026, 3, 1),
            end: date(2026, 3, 31),
            closed: false,
        }
    }

    fn rent() -> FixedMovement {
        let class = MovementClassRef {
            id: Uuid::now_v7(),
            name: "Rent".to_string(),
            movement_class_type: MovementClassType::Out,
            active: true,
            cost_center: CostCenterRef {
                id: Uuid::now_v7(),
                name: "Home".to_string(),
                blocked: false,
            },
        };
        let mut movement = Movement::new("Rent", dec!(1500));
        movement.add(Apportionment::new(dec!(1500), class));
        FixedMovement::new(movement, date(2026, 1, 10))
    }

    #[test]
    fn test_launch_undetermined() {
        let fixed = rent();
        let period = march();
        let plan = plan_launch(Uuid::now_v7(), &fixed, &period, 2, false).unwrap();

        assert_eq!(plan.launch.quote_number, None);
        assert!(!plan.finishes());
        assert_eq!(plan.movement.due_date, date(2026, 3, 10));
        assert_eq!(plan.movement.movement.value, dec!(1500));
        assert_eq!(plan.movement.movement.identification, "Rent");
        assert_eq!(plan.movement.financial_period_id, period.id);

        let copied = &plan.movement.movement.apportionments[0];
        let source = &fixed.movement.apportionments[0];
        assert_ne!(copied.code, source.code);
        assert!(copied.is_cost_center_and_movement_class_equals(source));
    }

    #[test]
    fn test_launch_quotes() {
        let mut fixed = rent();
        fixed.total_quotes = Some(3);

        let plan = plan_launch(Uuid::now_v7(), &fixed, &march(), 1, false).unwrap();
        assert_eq!(plan.launch.quote_number, Some(2));
        assert_eq!(plan.movement.movement.identification, "Rent 2/3");
        assert!(!plan.finishes());

        let plan = plan_launch(Uuid::now_v7(), &fixed, &march(), 2, false).unwrap();
        assert!(plan.launch.is_last_quote());
        assert!(plan.finishes());

        assert_eq!(
            plan_launch(Uuid::now_v7(), &fixed, &march(), 3, false),
            Err(FinancialError::FixedMovementFinished)
        );
    }

    #[test]
    fn test_launch_keeps_long_identifications_valid() {
        let mut fixed = rent();
        fixed.movement.identification = "x".repeat(IDENTIFICATION_MAX_LEN);
        fixed.total_quotes = Some(12);

        let plan = plan_launch(Uuid::now_v7(), &fixed, &march(), 0, false).unwrap();
        let identification = &plan.movement.movement.identification;

        assert_eq!(identification.chars().count(), IDENTIFICATION_MAX_LEN);
        assert!(identification.ends_with("x 1/12"));
        assert!(plan.movement.movement.validate().is_ok());
    }

    #[test]
    fn test_launch_starting_quote() {
        let mut fixed = rent();
        fixed.total_quotes = Some(10);
        fixed.starting_quote = 4;

        let plan = plan_launch(Uuid::now_v7(), &fixed, &march(), 0, false).unwrap();
        assert_eq!(plan.launch.quote_number, Some(4));
    }

    #[test]
    fn test_launch_rules() {
        let mut fixed = rent();
        let mut period = march();

        assert_eq!(
            plan_launch(Uuid::now_v7(), &fixed, &period, 0, true),
            Err(FinancialError::AlreadyLaunched)
        );

        period.closed = true;
        assert_eq!(
            plan_launch(Uuid::now_v7(), &fixed, &period, 0, false),
            Err(FinancialError::PeriodClosed)
        );

        fixed.state = FixedMovementState::Finished;
        assert_eq!(
            plan_launch(Uuid::now_v7(), &fixed, &march(), 0, false),
            Err(FinancialError::FixedMovementFinished)
        );
    }

    #[test]
    fn test_due_date_falls_back_to_period_end() {
        let mut fixed = rent();
        fixed.start_date = date(2026, 1, 31);
        let february = FinancialPeriod {
            id: Uuid::now_v7(),
            identification: "02/2026".to_string(),
            start: date(2026, 2, 1),
            end: date(2026, 2, 28),
            closed: false,
        };
        assert_eq!(fixed.due_date_in(&february), date(2026, 2, 28));
    }

    #[test]
    fn test_validate_quotes() {
        let mut fixed = rent();
        assert_eq!(fixed.validate(), Ok(()));

        fixed.total_quotes = Some(2);
        fixed.starting_quote = 3;
        assert_eq!(fixed.validate(), Err(FinancialError::NonPositiveValue));
    }
}
