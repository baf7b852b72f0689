//! Initial schema: dealers, parties, ledgers, payments, settlements,
//! and the business-ID counter table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            r"
DROP TABLE IF EXISTS settlements CASCADE;
DROP TABLE IF EXISTS loan_payments CASCADE;
DROP TABLE IF EXISTS crop_payments CASCADE;
DROP TABLE IF EXISTS loan_summaries CASCADE;
DROP TABLE IF EXISTS loans CASCADE;
DROP TABLE IF EXISTS crops CASCADE;
DROP TABLE IF EXISTS inventories CASCADE;
DROP TABLE IF EXISTS counters CASCADE;
DROP TABLE IF EXISTS buyers CASCADE;
DROP TABLE IF EXISTS farmers CASCADE;
DROP TABLE IF EXISTS dealers CASCADE;
DROP TYPE IF EXISTS crop_grade;
DROP TYPE IF EXISTS settlement_direction;
DROP TYPE IF EXISTS payment_mode;
DROP TYPE IF EXISTS party_kind;
DROP TYPE IF EXISTS loan_status;
DROP TYPE IF EXISTS payment_status;
",
        )
        .await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r#"
-- Enum types
CREATE TYPE payment_status AS ENUM ('NOT-DONE', 'PARTIAL-DONE', 'DONE');
CREATE TYPE loan_status AS ENUM ('ONGOING', 'PARTIAL-FINISHED', 'FINISHED');
CREATE TYPE party_kind AS ENUM ('FARMER', 'BUYER');
CREATE TYPE payment_mode AS ENUM ('CREDIT', 'DEBIT');
CREATE TYPE settlement_direction AS ENUM ('DEALER_TO_FARMER', 'FARMER_TO_DEALER', 'SETTLED');
CREATE TYPE crop_grade AS ENUM ('A', 'B', 'C', 'D', 'E');

-- Dealers: the tenancy root
CREATE TABLE dealers (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL UNIQUE,
    mobile VARCHAR(20) NOT NULL,
    market_name VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Business-ID sequences, keyed by composite scope string
CREATE TABLE counters (
    id VARCHAR(255) PRIMARY KEY,
    seq BIGINT NOT NULL DEFAULT 0
);

CREATE TABLE farmers (
    id UUID PRIMARY KEY,
    dealer_id UUID NOT NULL REFERENCES dealers(id) ON DELETE CASCADE,
    farmer_id VARCHAR(32) NOT NULL,
    name VARCHAR(255) NOT NULL,
    mobile VARCHAR(20) NOT NULL,
    year INTEGER NOT NULL,
    address TEXT NOT NULL,
    village VARCHAR(255) NOT NULL,
    city VARCHAR(255) NOT NULL,
    state VARCHAR(255) NOT NULL,
    zip VARCHAR(16) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_farmers_dealer_business UNIQUE (dealer_id, farmer_id)
);

CREATE INDEX idx_farmers_dealer ON farmers(dealer_id, created_at DESC);
CREATE INDEX idx_farmers_name ON farmers(dealer_id, name);

CREATE TABLE buyers (
    id UUID PRIMARY KEY,
    dealer_id UUID NOT NULL REFERENCES dealers(id) ON DELETE CASCADE,
    buyer_id VARCHAR(32) NOT NULL,
    name VARCHAR(255) NOT NULL,
    mobile VARCHAR(20) NOT NULL,
    year INTEGER NOT NULL,
    address TEXT NOT NULL,
    city VARCHAR(255) NOT NULL,
    state VARCHAR(255) NOT NULL,
    zip VARCHAR(16) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_buyers_dealer_business UNIQUE (dealer_id, buyer_id)
);

CREATE INDEX idx_buyers_dealer ON buyers(dealer_id, created_at DESC);

-- One running stock ledger per (dealer, crop type)
CREATE TABLE inventories (
    id UUID PRIMARY KEY,
    dealer_id UUID NOT NULL REFERENCES dealers(id) ON DELETE CASCADE,
    inventory_id VARCHAR(64) NOT NULL,
    crop_name VARCHAR(32) NOT NULL,
    gunny_quantity NUMERIC(20, 4) NOT NULL DEFAULT 0,
    buy_gunny NUMERIC(20, 4) NOT NULL DEFAULT 0,
    sell_gunny NUMERIC(20, 4) NOT NULL DEFAULT 0,
    in_stock_gunny NUMERIC(20, 4) NOT NULL DEFAULT 0,
    labour_charges NUMERIC(20, 4) NOT NULL DEFAULT 0,
    transport_charges NUMERIC(20, 4) NOT NULL DEFAULT 0,
    other_charges NUMERIC(20, 4) NOT NULL DEFAULT 0,
    total_in_stock NUMERIC(20, 4) NOT NULL DEFAULT 0,
    total_buy_quantity NUMERIC(20, 4) NOT NULL DEFAULT 0,
    total_sell_quantity NUMERIC(20, 4) NOT NULL DEFAULT 0,
    average_buy_price NUMERIC(20, 4) NOT NULL DEFAULT 0,
    average_sell_price NUMERIC(20, 4) NOT NULL DEFAULT 0,
    total_payment_buy NUMERIC(20, 4) NOT NULL DEFAULT 0,
    total_payment_sell NUMERIC(20, 4) NOT NULL DEFAULT 0,
    payment_receive_paid NUMERIC(20, 4) NOT NULL DEFAULT 0,
    payment_receive_pending NUMERIC(20, 4) NOT NULL DEFAULT 0,
    payment_give_paid NUMERIC(20, 4) NOT NULL DEFAULT 0,
    payment_give_pending NUMERIC(20, 4) NOT NULL DEFAULT 0,
    last_updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_inventories_dealer_crop UNIQUE (dealer_id, crop_name)
);

-- One row per crop purchase or sale
CREATE TABLE crops (
    id UUID PRIMARY KEY,
    dealer_id UUID NOT NULL REFERENCES dealers(id) ON DELETE CASCADE,
    crop_id VARCHAR(64) NOT NULL,
    person_type party_kind NOT NULL,
    person_ref_id UUID NOT NULL,
    person_business_id VARCHAR(32) NOT NULL,
    person_name VARCHAR(255) NOT NULL,
    crop_type VARCHAR(32) NOT NULL,
    grade crop_grade NOT NULL,
    quantity NUMERIC(20, 4) NOT NULL,
    no_of_gunny NUMERIC(20, 4) NOT NULL DEFAULT 0,
    gunny_quantity NUMERIC(20, 4) NOT NULL DEFAULT 0,
    price_per_quintal NUMERIC(20, 4) NOT NULL,
    labour_charges NUMERIC(20, 4) NOT NULL DEFAULT 0,
    transport_charges NUMERIC(20, 4) NOT NULL DEFAULT 0,
    other_charges NUMERIC(20, 4) NOT NULL DEFAULT 0,
    total_amount NUMERIC(20, 4) NOT NULL,
    paid_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    pending_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    payment_status payment_status NOT NULL DEFAULT 'NOT-DONE',
    date TIMESTAMPTZ NOT NULL DEFAULT now(),
    inventory JSONB NOT NULL DEFAULT '[]',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_crops_dealer_business UNIQUE (dealer_id, crop_id)
);

CREATE INDEX idx_crops_dealer_person ON crops(dealer_id, person_business_id, created_at);
CREATE INDEX idx_crops_dealer_status ON crops(dealer_id, payment_status);

CREATE TABLE loans (
    id UUID PRIMARY KEY,
    dealer_id UUID NOT NULL REFERENCES dealers(id) ON DELETE CASCADE,
    loan_id VARCHAR(64) NOT NULL,
    farmer_ref_id UUID NOT NULL REFERENCES farmers(id),
    farmer_business_id VARCHAR(32) NOT NULL,
    person_name VARCHAR(255) NOT NULL,
    loan_amount NUMERIC(20, 4) NOT NULL,
    interest_rate NUMERIC(10, 4) NOT NULL,
    period_in_days BIGINT NOT NULL DEFAULT 0,
    interest_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    paid_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    pending_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    remark TEXT NOT NULL,
    status loan_status NOT NULL DEFAULT 'ONGOING',
    summary JSONB NOT NULL DEFAULT '[]',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_loans_dealer_business UNIQUE (dealer_id, loan_id)
);

CREATE INDEX idx_loans_dealer_farmer ON loans(dealer_id, farmer_business_id, created_at);
CREATE INDEX idx_loans_dealer_status ON loans(dealer_id, status);

-- One running loan aggregate per dealer
CREATE TABLE loan_summaries (
    id UUID PRIMARY KEY,
    dealer_id UUID NOT NULL UNIQUE REFERENCES dealers(id) ON DELETE CASCADE,
    total_loan_given NUMERIC(20, 4) NOT NULL DEFAULT 0,
    total_interest_accrued NUMERIC(20, 4) NOT NULL DEFAULT 0,
    total_payable_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    total_paid_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    total_pending_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    average_interest_rate NUMERIC(10, 4) NOT NULL DEFAULT 0,
    total_loans INTEGER NOT NULL DEFAULT 0,
    ongoing_loans INTEGER NOT NULL DEFAULT 0,
    finished_loans INTEGER NOT NULL DEFAULT 0,
    last_updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Immutable payment records; reversals are new rows
CREATE TABLE crop_payments (
    id UUID PRIMARY KEY,
    dealer_id UUID NOT NULL REFERENCES dealers(id) ON DELETE CASCADE,
    payment_id VARCHAR(64) NOT NULL,
    person_type party_kind NOT NULL,
    person_ref_id UUID NOT NULL,
    person_business_id VARCHAR(32) NOT NULL,
    person_name VARCHAR(255) NOT NULL,
    mode payment_mode NOT NULL,
    payments JSONB NOT NULL DEFAULT '[]',
    total_crop_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    amount_paid NUMERIC(20, 4) NOT NULL DEFAULT 0,
    pending_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    status payment_status NOT NULL DEFAULT 'PARTIAL-DONE',
    is_reversal BOOLEAN NOT NULL DEFAULT FALSE,
    reversed_payment_id VARCHAR(64),
    date TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_crop_payments_dealer ON crop_payments(dealer_id, created_at DESC);
CREATE INDEX idx_crop_payments_business ON crop_payments(dealer_id, payment_id);
CREATE INDEX idx_crop_payments_reversal ON crop_payments(dealer_id, is_reversal);

CREATE TABLE loan_payments (
    id UUID PRIMARY KEY,
    dealer_id UUID NOT NULL REFERENCES dealers(id) ON DELETE CASCADE,
    payment_id VARCHAR(64) NOT NULL,
    farmer_ref_id UUID NOT NULL REFERENCES farmers(id),
    farmer_name VARCHAR(255) NOT NULL,
    farmer_business_id VARCHAR(32) NOT NULL,
    mode payment_mode NOT NULL,
    payments JSONB NOT NULL DEFAULT '[]',
    total_loan_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    amount_received NUMERIC(20, 4) NOT NULL DEFAULT 0,
    paid_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    pending_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    status payment_status NOT NULL DEFAULT 'PARTIAL-DONE',
    is_reversal BOOLEAN NOT NULL DEFAULT FALSE,
    reversed_payment_id VARCHAR(64),
    date TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_loan_payments_dealer ON loan_payments(dealer_id, created_at DESC);
CREATE INDEX idx_loan_payments_business ON loan_payments(dealer_id, payment_id);
CREATE INDEX idx_loan_payments_farmer ON loan_payments(dealer_id, farmer_business_id);

CREATE TABLE settlements (
    id UUID PRIMARY KEY,
    dealer_id UUID NOT NULL REFERENCES dealers(id) ON DELETE CASCADE,
    settlement_id VARCHAR(64) NOT NULL,
    farmer_ref_id UUID NOT NULL REFERENCES farmers(id),
    farmer_name VARCHAR(255) NOT NULL,
    farmer_business_id VARCHAR(32) NOT NULL,
    crop_payments JSONB NOT NULL DEFAULT '[]',
    loan_payments JSONB NOT NULL DEFAULT '[]',
    total_crop_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    total_loan_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    net_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    settlement_direction settlement_direction NOT NULL DEFAULT 'SETTLED',
    paid_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    pending_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    status payment_status NOT NULL DEFAULT 'PARTIAL-DONE',
    is_reversal BOOLEAN NOT NULL DEFAULT FALSE,
    reversed_settlement_id VARCHAR(64),
    date TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_settlements_dealer ON settlements(dealer_id, created_at DESC);
CREATE INDEX idx_settlements_business ON settlements(dealer_id, settlement_id);
CREATE INDEX idx_settlements_farmer ON settlements(dealer_id, farmer_business_id);
"#;
