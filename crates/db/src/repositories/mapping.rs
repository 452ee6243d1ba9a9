//! Conversions between database models and domain types.

use webbudget_core::configuration::Authorization;
use webbudget_core::financial::{
    BalanceType as CoreBalanceType, Closing, FinancialPeriod,
    FixedMovementState as CoreFixedState, MovementState as CoreMovementState,
    PaymentMethod as CorePaymentMethod, ReasonType as CoreReasonType, WalletBalance,
};
use webbudget_core::journal::{Fuel, FuelType as CoreFuelType};
use webbudget_core::registration::{
    Card, CardType as CoreCardType, Color, CostCenter, CostCenterRef, MovementClass,
    MovementClassRef, MovementClassType as CoreClassType, Vehicle, VehicleRef, Wallet,
    WalletType as CoreWalletType,
};

use crate::entities::sea_orm_active_enums::{
    BalanceType, CardType, FixedMovementState, FuelType, MovementClassType, MovementState,
    PaymentMethod, ReasonType, WalletType,
};
use crate::entities::{
    authorizations, cards, closings, cost_centers, financial_periods, fuels, movement_classes,
    vehicles, wallet_balances, wallets,
};

macro_rules! mirror_enum {
    ($db:ident, $core:ident, { $($variant:ident),+ $(,)? }) => {
        impl From<$core> for $db {
            fn from(value: $core) -> Self {
                match value {
                    $($core::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$db> for $core {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(MovementClassType, CoreClassType, { In, Out });
mirror_enum!(WalletType, CoreWalletType, { Personal, Bank, Investment });
mirror_enum!(CardType, CoreCardType, { Credit, Debit });
mirror_enum!(MovementState, CoreMovementState, { Open, Paid, Accounted });
mirror_enum!(FixedMovementState, CoreFixedState, { Active, Finished });
mirror_enum!(PaymentMethod, CorePaymentMethod, { Cash, CreditCard, DebitCard });
mirror_enum!(BalanceType, CoreBalanceType, { Debit, Credit });
mirror_enum!(ReasonType, CoreReasonType, {
    Return,
    Revenue,
    Expense,
    Adjustment,
    DebitCard,
    Transference,
});
mirror_enum!(FuelType, CoreFuelType, { Gasoline, Ethanol, Diesel, Gas });

/// Builds a cost center reference.
#[must_use]
pub fn cost_center_ref(model: &cost_centers::Model) -> CostCenterRef {
    CostCenterRef {
        id: model.id,
        name: model.name.clone(),
        blocked: model.blocked,
    }
}

/// Builds a cost center; stored colors that fail to parse get a random one.
#[must_use]
pub fn cost_center(model: cost_centers::Model, parent: Option<&cost_centers::Model>) -> CostCenter {
    CostCenter {
        id: model.id,
        color: Color::parse(&model.color).unwrap_or_else(|_| Color::random()),
        name: model.name,
        expenses_budget: model.expenses_budget,
        revenues_budget: model.revenues_budget,
        blocked: model.blocked,
        description: model.description,
        parent: parent.map(cost_center_ref),
        percentage: rust_decimal::Decimal::ZERO,
        total_movements: rust_decimal::Decimal::ZERO,
    }
}

/// Builds a movement class.
#[must_use]
pub fn movement_class(
    model: movement_classes::Model,
    cost_center: &cost_centers::Model,
) -> MovementClass {
    MovementClass {
        id: model.id,
        name: model.name,
        budget: model.budget,
        active: model.active,
        movement_class_type: model.movement_class_type.into(),
        cost_center: cost_center_ref(cost_center),
        total_movements: rust_decimal::Decimal::ZERO,
    }
}

/// Builds a movement class reference.
#[must_use]
pub fn movement_class_ref(
    model: &movement_classes::Model,
    cost_center: &cost_centers::Model,
) -> MovementClassRef {
    MovementClassRef {
        id: model.id,
        name: model.name.clone(),
        movement_class_type: model.movement_class_type.into(),
        active: model.active,
        cost_center: cost_center_ref(cost_center),
    }
}

/// Builds a wallet.
#[must_use]
pub fn wallet(model: wallets::Model) -> Wallet {
    Wallet {
        id: model.id,
        name: model.name,
        wallet_type: model.wallet_type.into(),
        bank: model.bank,
        agency: model.agency,
        account: model.account,
        description: model.description,
        actual_balance: model.actual_balance,
        active: model.active,
    }
}

/// Builds a wallet balance.
#[must_use]
pub fn wallet_balance(model: wallet_balances::Model) -> WalletBalance {
    WalletBalance {
        actual_balance: model.actual_balance,
        old_balance: model.old_balance,
        transaction_value: model.transaction_value,
        movement_code: model.movement_code,
        observations: model.observations,
        movement_date_time: model.movement_date_time,
        balance_type: model.balance_type.into(),
        reason_type: model.reason_type.into(),
        wallet_id: model.wallet_id,
    }
}

/// Builds a card.
#[must_use]
pub fn card(model: cards::Model) -> Card {
    Card {
        id: model.id,
        name: model.name,
        flag: model.flag,
        card_type: model.card_type.into(),
        credit_limit: model.credit_limit,
        expiration_day: model.expiration_day,
        active: model.active,
        wallet_id: model.wallet_id,
    }
}

/// Builds a vehicle.
#[must_use]
pub fn vehicle(model: vehicles::Model, cost_center: &cost_centers::Model) -> Vehicle {
    Vehicle {
        id: model.id,
        identification: model.identification,
        brand: model.brand,
        model: model.model,
        license_plate: model.license_plate,
        model_year: model.model_year,
        fuel_capacity: model.fuel_capacity,
        odometer: model.odometer,
        cost_center: cost_center_ref(cost_center),
        active: model.active,
    }
}

/// Builds a vehicle reference.
#[must_use]
pub fn vehicle_ref(model: &vehicles::Model, cost_center: &cost_centers::Model) -> VehicleRef {
    VehicleRef {
        id: model.id,
        identification: model.identification.clone(),
        odometer: model.odometer,
        cost_center: cost_center_ref(cost_center),
    }
}

/// Builds a financial period.
#[must_use]
pub fn financial_period(model: financial_periods::Model) -> FinancialPeriod {
    FinancialPeriod {
        id: model.id,
        identification: model.identification,
        start: model.start_date,
        end: model.end_date,
        closed: model.closed,
    }
}

/// Builds a closing.
#[must_use]
pub fn closing(model: closings::Model) -> Closing {
    Closing {
        revenues: model.revenues,
        expenses: model.expenses,
        credit_card_expenses: model.credit_card_expenses,
        debit_card_expenses: model.debit_card_expenses,
        cash_expenses: model.cash_expenses,
        balance: model.balance,
        accumulated: model.accumulated,
        closing_date: model.closing_date,
        financial_period_id: model.financial_period_id,
    }
}

/// Builds a fuel.
#[must_use]
pub fn fuel(model: fuels::Model) -> Fuel {
    Fuel {
        fuel_type: model.fuel_type.into(),
        liters: model.liters,
        value_per_liter: model.value_per_liter,
        cost: model.cost,
    }
}

/// Builds an authorization.
#[must_use]
pub fn authorization(model: &authorizations::Model) -> Authorization {
    Authorization::new(model.functionality_name.clone(), model.permission_name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn cost_center_model(name: &str, color: &str) -> cost_centers::Model {
        cost_centers::Model {
            id: Uuid::now_v7(),
            name: name.to_string(),
            color: color.to_string(),
            expenses_budget: dec!(500),
            revenues_budget: dec!(0),
            blocked: false,
            description: None,
            parent_id: None,
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
        }
    }

    #[test]
    fn test_cost_center_keeps_parent_reference() {
        let parent = cost_center_model("House", "#112233");
        let mut child = cost_center_model("Kitchen", "#445566");
        child.parent_id = Some(parent.id);

        let mapped = cost_center(child, Some(&parent));

        assert_eq!(mapped.color.as_str(), "#445566");
        assert_eq!(mapped.parent_name(), Some("House"));
        assert_eq!(mapped.expenses_budget, dec!(500));
    }

    #[test]
    fn test_cost_center_with_corrupt_color_gets_a_valid_one() {
        let mapped = cost_center(cost_center_model("House", "blue"), None);

        assert!(Color::parse(mapped.color.as_str()).is_ok());
        assert!(mapped.parent.is_none());
    }

    #[test]
    fn test_movement_class_ref_carries_cost_center() {
        let cc = cost_center_model("Car", "#000000");
        let class = movement_classes::Model {
            id: Uuid::now_v7(),
            name: "Fuel".to_string(),
            budget: dec!(300),
            active: true,
            movement_class_type: MovementClassType::Out,
            cost_center_id: cc.id,
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
        };

        let reference = movement_class_ref(&class, &cc);

        assert!(reference.is_expense());
        assert_eq!(reference.cost_center.id, cc.id);
        assert_eq!(reference.cost_center.name, "Car");
    }

    #[test]
    fn test_enum_mirrors_keep_variants() {
        assert_eq!(CoreReasonType::from(ReasonType::DebitCard), CoreReasonType::DebitCard);
        assert_eq!(PaymentMethod::from(CorePaymentMethod::CreditCard), PaymentMethod::CreditCard);
        assert_eq!(CoreFuelType::from(FuelType::Ethanol), CoreFuelType::Ethanol);
    }
}
