//! Cost centers: the budget-tracking buckets movements are attributed to.

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::RegistrationError;
use super::movement_class::MovementClassType;
use super::{require_money, require_text};

/// Maximum length of a cost center name.
pub const NAME_MAX_LEN: usize = 90;

/// An RGB color in `#rrggbb` notation, used to tell cost centers apart on charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// Creates a random color.
    #[must_use]
    pub fn random() -> Self {
        let [r, g, b]: [u8; 3] = rand::rng().random();
        Self(format!("#{r:02x}{g:02x}{b:02x}"))
    }

    /// Parses a `#rrggbb` color, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationError::InvalidColor` for anything else.
    pub fn parse(value: &str) -> Result<Self, RegistrationError> {
        let hex = value
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| RegistrationError::InvalidColor(value.to_string()))?;
        Ok(Self(format!("#{}", hex.to_ascii_lowercase())))
    }

    /// Returns the color as `#rrggbb`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Color {
    type Error = RegistrationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

/// A lightweight reference to a cost center, as carried by apportionments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostCenterRef {
    /// Cost center ID.
    pub id: Uuid,
    /// Cost center name.
    pub name: String,
    /// Blocked cost centers accept no new movements.
    pub blocked: bool,
}

/// A cost center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostCenter {
    /// Cost center ID.
    pub id: Uuid,
    /// Name, unique and at most 90 characters.
    pub name: String,
    /// Chart color.
    pub color: Color,
    /// Budget for expenses; zero means expenses are not controlled.
    pub expenses_budget: Decimal,
    /// Budget for revenues; zero means revenues are not controlled.
    pub revenues_budget: Decimal,
    /// Blocked cost centers accept no new movements.
    pub blocked: bool,
    /// Free text description.
    pub description: Option<String>,
    /// Optional parent in the cost center tree.
    pub parent: Option<CostCenterRef>,
    /// Share of the period total attributed to this cost center.
    pub percentage: Decimal,
    /// Sum of the movements attributed in the period being inspected.
    pub total_movements: Decimal,
}

impl CostCenter {
    /// Creates an unblocked cost center with zero budgets and a random color.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            color: Color::random(),
            expenses_budget: Decimal::ZERO,
            revenues_budget: Decimal::ZERO,
            blocked: false,
            description: None,
            parent: None,
            percentage: Decimal::ZERO,
            total_movements: Decimal::ZERO,
        }
    }

    /// Returns the parent cost center name, if any.
    #[must_use]
    pub fn parent_name(&self) -> Option<&str> {
        self.parent.as_ref().map(|p| p.name.as_str())
    }

    /// Returns true if this cost center controls the budget consumed by the given class type.
    #[must_use]
    pub fn control_budget(&self, class_type: MovementClassType) -> bool {
        self.budget_for(class_type) > Decimal::ZERO
    }

    /// Returns the budget consumed by movements of the given class type.
    #[must_use]
    pub fn budget_for(&self, class_type: MovementClassType) -> Decimal {
        match class_type {
            MovementClassType::In => self.revenues_budget,
            MovementClassType::Out => self.expenses_budget,
        }
    }

    /// Returns a reference to this cost center.
    #[must_use]
    pub fn to_ref(&self) -> CostCenterRef {
        CostCenterRef {
            id: self.id,
            name: self.name.clone(),
            blocked: self.blocked,
        }
    }

    /// Validates the cost center before it is saved.
    ///
    /// # Errors
    ///
    /// Returns a `RegistrationError` describing the first violated rule.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        require_text("name", &self.name, NAME_MAX_LEN)?;
        if self.expenses_budget < Decimal::ZERO {
            return Err(RegistrationError::Negative("expenses_budget"));
        }
        if self.revenues_budget < Decimal::ZERO {
            return Err(RegistrationError::Negative("revenues_budget"));
        }
        require_money("expenses_budget", self.expenses_budget)?;
        require_money("revenues_budget", self.revenues_budget)?;
        if self.parent.as_ref().is_some_and(|p| p.id == self.id) {
            return Err(RegistrationError::SelfParent);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_cost_center_defaults() {
        let cc = CostCenter::new("Home");
        assert_eq!(cc.expenses_budget, Decimal::ZERO);
        assert_eq!(cc.revenues_budget, Decimal::ZERO);
        assert_eq!(cc.percentage, Decimal::ZERO);
        assert_eq!(cc.total_movements, Decimal::ZERO);
        assert!(!cc.blocked);
        assert!(Color::parse(cc.color.as_str()).is_ok());
        assert!(cc.parent_name().is_none());
    }

    #[test]
    fn test_control_budget_by_class_type() {
        let mut cc = CostCenter::new("Home");
        assert!(!cc.control_budget(MovementClassType::In));
        assert!(!cc.control_budget(MovementClassType::Out));

        cc.revenues_budget = dec!(1000);
        assert!(cc.control_budget(MovementClassType::In));
        assert!(!cc.control_budget(MovementClassType::Out));

        cc.expenses_budget = dec!(0.01);
        assert!(cc.control_budget(MovementClassType::Out));
    }

    #[test]
    fn test_parent_name() {
        let parent = CostCenter::new("Family");
        let mut child = CostCenter::new("Kids");
        child.parent = Some(parent.to_ref());
        assert_eq!(child.parent_name(), Some("Family"));
    }

    #[test]
    fn test_validate() {
        let mut cc = CostCenter::new("  ");
        assert_eq!(cc.validate(), Err(RegistrationError::Required("name")));

        cc.name = "x".repeat(91);
        assert!(matches!(
            cc.validate(),
            Err(RegistrationError::TooLong { max: 90, .. })
        ));

        cc.name = "Home".to_string();
        cc.expenses_budget = dec!(-1);
        assert_eq!(
            cc.validate(),
            Err(RegistrationError::Negative("expenses_budget"))
        );

        cc.expenses_budget = dec!(10.005);
        assert_eq!(
            cc.validate(),
            Err(RegistrationError::AmountOutOfRange {
                field: "expenses_budget",
                value: dec!(10.005),
            })
        );

        cc.expenses_budget = dec!(10);
        cc.parent = Some(cc.to_ref());
        assert_eq!(cc.validate(), Err(RegistrationError::SelfParent));

        cc.parent = None;
        assert!(cc.validate().is_ok());
    }

    #[test]
    fn test_color_parse() {
        assert_eq!(Color::parse("#A1B2C3").unwrap().as_str(), "#a1b2c3");
        assert!(Color::parse("a1b2c3").is_err());
        assert!(Color::parse("#a1b2c").is_err());
        assert!(Color::parse("#zzzzzz").is_err());
    }
}
