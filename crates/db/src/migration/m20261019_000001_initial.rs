//! Initial database migration.
//!
//! Creates the enums, tables and triggers of the registration, financial,
//! journal and configuration areas.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CONFIGURATION
        // ============================================================
        db.execute_unprepared(CONFIGURATION_SQL).await?;

        // ============================================================
        // PART 3: REGISTRATION
        // ============================================================
        db.execute_unprepared(REGISTRATION_SQL).await?;

        // ============================================================
        // PART 4: FINANCIAL
        // ============================================================
        db.execute_unprepared(FINANCIAL_SQL).await?;

        // ============================================================
        // PART 5: JOURNAL
        // ============================================================
        db.execute_unprepared(JOURNAL_SQL).await?;

        // ============================================================
        // PART 6: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE movement_class_type AS ENUM ('in', 'out');
CREATE TYPE wallet_type AS ENUM ('personal', 'bank', 'investment');
CREATE TYPE card_type AS ENUM ('credit', 'debit');
CREATE TYPE movement_kind AS ENUM ('period', 'fixed');
CREATE TYPE movement_state AS ENUM ('open', 'paid', 'accounted');
CREATE TYPE fixed_movement_state AS ENUM ('active', 'finished');
CREATE TYPE payment_method AS ENUM ('cash', 'credit_card', 'debit_card');
CREATE TYPE balance_type AS ENUM ('debit', 'credit');
CREATE TYPE reason_type AS ENUM (
    'return',
    'revenue',
    'expense',
    'adjustment',
    'debit_card',
    'transference'
);
CREATE TYPE fuel_type AS ENUM ('gasoline', 'ethanol', 'diesel', 'gas');
";

const CONFIGURATION_SQL: &str = r"
CREATE TABLE groups (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(45) NOT NULL UNIQUE,
    blocked BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE authorizations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    functionality_name VARCHAR(90) NOT NULL,
    permission_name VARCHAR(90) NOT NULL,
    UNIQUE (functionality_name, permission_name)
);

CREATE TABLE grants (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    group_id UUID NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
    authorization_id UUID NOT NULL REFERENCES authorizations(id) ON DELETE CASCADE,
    UNIQUE (group_id, authorization_id)
);

CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(90) NOT NULL,
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    blocked BOOLEAN NOT NULL DEFAULT false,
    group_id UUID REFERENCES groups(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_users_email ON users(email) WHERE blocked = false;
";

const REGISTRATION_SQL: &str = r"
CREATE TABLE cost_centers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(90) NOT NULL UNIQUE,
    color VARCHAR(7) NOT NULL,
    expenses_budget NUMERIC(15, 2) NOT NULL DEFAULT 0 CHECK (expenses_budget >= 0),
    revenues_budget NUMERIC(15, 2) NOT NULL DEFAULT 0 CHECK (revenues_budget >= 0),
    blocked BOOLEAN NOT NULL DEFAULT false,
    description TEXT,
    parent_id UUID REFERENCES cost_centers(id) CHECK (parent_id <> id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE movement_classes (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(45) NOT NULL,
    budget NUMERIC(15, 2) NOT NULL DEFAULT 0 CHECK (budget >= 0),
    active BOOLEAN NOT NULL DEFAULT true,
    movement_class_type movement_class_type NOT NULL,
    cost_center_id UUID NOT NULL REFERENCES cost_centers(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (name, cost_center_id, movement_class_type)
);

CREATE INDEX idx_movement_classes_cost_center ON movement_classes(cost_center_id);

CREATE TABLE wallets (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(90) NOT NULL,
    wallet_type wallet_type NOT NULL,
    bank VARCHAR(45),
    agency VARCHAR(10),
    account VARCHAR(20),
    description TEXT,
    actual_balance NUMERIC(15, 2) NOT NULL DEFAULT 0,
    active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE cards (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(90) NOT NULL,
    flag VARCHAR(45),
    card_type card_type NOT NULL,
    credit_limit NUMERIC(15, 2) NOT NULL DEFAULT 0 CHECK (credit_limit >= 0),
    expiration_day SMALLINT NOT NULL DEFAULT 1 CHECK (expiration_day BETWEEN 1 AND 31),
    active BOOLEAN NOT NULL DEFAULT true,
    wallet_id UUID REFERENCES wallets(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CHECK (card_type = 'credit' OR wallet_id IS NOT NULL)
);

CREATE TABLE vehicles (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    identification VARCHAR(90) NOT NULL,
    brand VARCHAR(90),
    model VARCHAR(90),
    license_plate VARCHAR(10),
    model_year INTEGER,
    fuel_capacity INTEGER CHECK (fuel_capacity >= 0),
    odometer BIGINT NOT NULL DEFAULT 0 CHECK (odometer >= 0),
    cost_center_id UUID NOT NULL REFERENCES cost_centers(id),
    active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const FINANCIAL_SQL: &str = r"
CREATE TABLE financial_periods (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    identification VARCHAR(45) NOT NULL UNIQUE,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    closed BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CHECK (start_date < end_date)
);

CREATE TABLE movements (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(6) NOT NULL UNIQUE,
    kind movement_kind NOT NULL,
    identification VARCHAR(90) NOT NULL,
    description TEXT,
    value NUMERIC(15, 2) NOT NULL CHECK (value > 0),
    contact VARCHAR(90),
    due_date DATE,
    financial_period_id UUID REFERENCES financial_periods(id),
    state movement_state,
    start_date DATE,
    total_quotes INTEGER CHECK (total_quotes > 0),
    starting_quote INTEGER CHECK (starting_quote > 0),
    fixed_state fixed_movement_state,
    auto_launch BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CHECK (
        (kind = 'period' AND due_date IS NOT NULL AND financial_period_id IS NOT NULL AND state IS NOT NULL)
        OR (kind = 'fixed' AND start_date IS NOT NULL AND fixed_state IS NOT NULL)
    )
);

CREATE INDEX idx_movements_period ON movements(financial_period_id) WHERE kind = 'period';

CREATE TABLE apportionments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(6) NOT NULL,
    movement_id UUID NOT NULL REFERENCES movements(id) ON DELETE CASCADE,
    cost_center_id UUID NOT NULL REFERENCES cost_centers(id),
    movement_class_id UUID NOT NULL REFERENCES movement_classes(id),
    value NUMERIC(15, 2) NOT NULL CHECK (value > 0),
    UNIQUE (movement_id, cost_center_id, movement_class_id)
);

CREATE INDEX idx_apportionments_class ON apportionments(movement_class_id);

CREATE TABLE payments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    movement_id UUID NOT NULL UNIQUE REFERENCES movements(id) ON DELETE CASCADE,
    paid_on DATE NOT NULL,
    discount NUMERIC(15, 2) NOT NULL DEFAULT 0 CHECK (discount >= 0),
    paid_value NUMERIC(15, 2) NOT NULL CHECK (paid_value >= 0),
    payment_method payment_method NOT NULL,
    card_id UUID REFERENCES cards(id),
    wallet_id UUID REFERENCES wallets(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE wallet_balances (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    wallet_id UUID NOT NULL REFERENCES wallets(id),
    actual_balance NUMERIC(15, 2) NOT NULL,
    old_balance NUMERIC(15, 2) NOT NULL,
    transaction_value NUMERIC(15, 2) NOT NULL,
    movement_code VARCHAR(6),
    observations TEXT,
    movement_date_time TIMESTAMP NOT NULL,
    balance_type balance_type NOT NULL,
    reason_type reason_type NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_wallet_balances_wallet ON wallet_balances(wallet_id, movement_date_time DESC);

CREATE TABLE launches (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(6) NOT NULL UNIQUE,
    quote_number INTEGER,
    total_quotes INTEGER,
    financial_period_id UUID NOT NULL REFERENCES financial_periods(id),
    fixed_movement_id UUID NOT NULL REFERENCES movements(id) ON DELETE CASCADE,
    period_movement_id UUID NOT NULL REFERENCES movements(id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (fixed_movement_id, financial_period_id)
);

CREATE TABLE closings (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    financial_period_id UUID NOT NULL UNIQUE REFERENCES financial_periods(id),
    revenues NUMERIC(15, 2) NOT NULL DEFAULT 0,
    expenses NUMERIC(15, 2) NOT NULL DEFAULT 0,
    credit_card_expenses NUMERIC(15, 2) NOT NULL DEFAULT 0,
    debit_card_expenses NUMERIC(15, 2) NOT NULL DEFAULT 0,
    cash_expenses NUMERIC(15, 2) NOT NULL DEFAULT 0,
    balance NUMERIC(15, 2) NOT NULL DEFAULT 0,
    accumulated NUMERIC(15, 2) NOT NULL DEFAULT 0,
    closing_date DATE NOT NULL DEFAULT CURRENT_DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const JOURNAL_SQL: &str = r"
CREATE TABLE refuelings (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(6) NOT NULL UNIQUE,
    accounted BOOLEAN NOT NULL DEFAULT false,
    accounted_by VARCHAR(6),
    first_refueling BOOLEAN NOT NULL DEFAULT false,
    full_tank BOOLEAN NOT NULL DEFAULT true,
    odometer BIGINT NOT NULL CHECK (odometer >= 0),
    distance BIGINT NOT NULL DEFAULT 0,
    average_consumption NUMERIC(15, 3),
    liters NUMERIC(15, 3) NOT NULL DEFAULT 0,
    cost NUMERIC(15, 2) NOT NULL DEFAULT 0,
    cost_per_liter NUMERIC(15, 2) NOT NULL DEFAULT 0,
    place VARCHAR(90),
    event_date DATE NOT NULL DEFAULT CURRENT_DATE,
    period_movement_id UUID REFERENCES movements(id) ON DELETE SET NULL,
    vehicle_id UUID NOT NULL REFERENCES vehicles(id),
    movement_class_id UUID NOT NULL REFERENCES movement_classes(id),
    financial_period_id UUID NOT NULL REFERENCES financial_periods(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_refuelings_vehicle ON refuelings(vehicle_id, odometer DESC);

CREATE TABLE fuels (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    refueling_id UUID NOT NULL REFERENCES refuelings(id) ON DELETE CASCADE,
    fuel_type fuel_type NOT NULL,
    liters NUMERIC(15, 3) NOT NULL CHECK (liters > 0),
    value_per_liter NUMERIC(15, 3) NOT NULL CHECK (value_per_liter > 0),
    cost NUMERIC(15, 2) NOT NULL
);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: check_apportionment_total
-- Apportionments must add up to the movement value at commit
-- ============================================================
CREATE OR REPLACE FUNCTION check_apportionment_total()
RETURNS TRIGGER AS $$
DECLARE
    target_id UUID;
    movement_value NUMERIC(15, 2);
    apportioned NUMERIC(15, 2);
BEGIN
    IF TG_TABLE_NAME = 'movements' THEN
        target_id := NEW.id;
    ELSIF TG_OP = 'DELETE' THEN
        target_id := OLD.movement_id;
    ELSE
        target_id := NEW.movement_id;
    END IF;

    SELECT value INTO movement_value FROM movements WHERE id = target_id;
    IF NOT FOUND THEN
        RETURN NULL;
    END IF;

    SELECT COALESCE(SUM(value), 0) INTO apportioned
    FROM apportionments
    WHERE movement_id = target_id;

    IF apportioned <> movement_value THEN
        RAISE EXCEPTION 'Movement is not fully apportioned. Value: %, Apportioned: %',
            movement_value, apportioned;
    END IF;

    RETURN NULL;
END;
$$ LANGUAGE plpgsql;

CREATE CONSTRAINT TRIGGER trg_check_apportionments
AFTER INSERT OR UPDATE OR DELETE ON apportionments
DEFERRABLE INITIALLY DEFERRED
FOR EACH ROW
EXECUTE FUNCTION check_apportionment_total();

CREATE CONSTRAINT TRIGGER trg_check_movement_value
AFTER INSERT OR UPDATE OF value ON movements
DEFERRABLE INITIALLY DEFERRED
FOR EACH ROW
EXECUTE FUNCTION check_apportionment_total();

-- ============================================================
-- FUNCTION: prevent_accounted_modification
-- Accounted movements belong to a closing and never change
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_accounted_modification()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.state = 'accounted' THEN
        RAISE EXCEPTION 'Accounted movement % cannot be modified', OLD.code;
    END IF;
    IF TG_OP = 'DELETE' THEN
        RETURN OLD;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_accounted_mod
BEFORE UPDATE OR DELETE ON movements
FOR EACH ROW
EXECUTE FUNCTION prevent_accounted_modification();

-- ============================================================
-- FUNCTION: touch_updated_at
-- ============================================================
CREATE OR REPLACE FUNCTION touch_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at := now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_groups_updated_at BEFORE UPDATE ON groups
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_users_updated_at BEFORE UPDATE ON users
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_cost_centers_updated_at BEFORE UPDATE ON cost_centers
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_movement_classes_updated_at BEFORE UPDATE ON movement_classes
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_wallets_updated_at BEFORE UPDATE ON wallets
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_cards_updated_at BEFORE UPDATE ON cards
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_vehicles_updated_at BEFORE UPDATE ON vehicles
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_financial_periods_updated_at BEFORE UPDATE ON financial_periods
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_movements_updated_at BEFORE UPDATE ON movements
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_refuelings_updated_at BEFORE UPDATE ON refuelings
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

DROP TABLE IF EXISTS fuels CASCADE;
DROP TABLE IF EXISTS refuelings CASCADE;
DROP TABLE IF EXISTS closings CASCADE;
DROP TABLE IF EXISTS launches CASCADE;
DROP TABLE IF EXISTS wallet_balances CASCADE;
DROP TABLE IF EXISTS payments CASCADE;
DROP TABLE IF EXISTS apportionments CASCADE;
DROP TABLE IF EXISTS movements CASCADE;
DROP TABLE IF EXISTS financial_periods CASCADE;
DROP TABLE IF EXISTS vehicles CASCADE;
DROP TABLE IF EXISTS cards CASCADE;
DROP TABLE IF EXISTS wallets CASCADE;
DROP TABLE IF EXISTS movement_classes CASCADE;
DROP TABLE IF EXISTS cost_centers CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TABLE IF EXISTS grants CASCADE;
DROP TABLE IF EXISTS authorizations CASCADE;
DROP TABLE IF EXISTS groups CASCADE;

DROP FUNCTION IF EXISTS touch_updated_at();
DROP FUNCTION IF EXISTS prevent_accounted_modification();
DROP FUNCTION IF EXISTS check_apportionment_total();

DROP TYPE IF EXISTS fuel_type;
DROP TYPE IF EXISTS reason_type;
DROP TYPE IF EXISTS balance_type;
DROP TYPE IF EXISTS payment_method;
DROP TYPE IF EXISTS fixed_movement_state;
DROP TYPE IF EXISTS movement_state;
DROP TYPE IF EXISTS movement_kind;
DROP TYPE IF EXISTS card_type;
DROP TYPE IF EXISTS wallet_type;
DROP TYPE IF EXISTS movement_class_type;
";
