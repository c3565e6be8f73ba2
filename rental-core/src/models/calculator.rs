use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Purchase, financing and operating parameters for one investment scenario.
///
/// Percentages are whole numbers (`20` means 20%). No field is clamped or
/// cross-checked against another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorInputs {
    pub purchase_price: Decimal,
    pub down_payment_percent: Decimal,
    /// Annual nominal interest rate, in percent.
    pub interest_rate: Decimal,
    pub loan_term_years: Decimal,
    pub monthly_rent: Decimal,
    pub property_tax_annual: Decimal,
    pub insurance_annual: Decimal,
    /// Maintenance reserve as a percentage of monthly rent.
    pub maintenance_percent: Decimal,
    /// Expected vacancy as a percentage of monthly rent.
    pub vacancy_percent: Decimal,
}

impl Default for CalculatorInputs {
    fn default() -> Self {
        Self {
            purchase_price: dec!(300000),
            down_payment_percent: dec!(20),
            interest_rate: dec!(3.5),
            loan_term_years: dec!(25),
            monthly_rent: dec!(1200),
            property_tax_annual: dec!(1500),
            insurance_annual: dec!(600),
            maintenance_percent: dec!(5),
            vacancy_percent: dec!(5),
        }
    }
}

/// Every figure derived from a [`CalculatorInputs`].
///
/// Values are unrounded; round only when presenting them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorResults {
    // Investment amounts
    pub down_payment: Decimal,
    pub loan_amount: Decimal,
    pub closing_costs: Decimal,
    pub total_cash_invested: Decimal,

    // Monthly figures
    pub monthly_mortgage: Decimal,
    pub monthly_expenses: Decimal,
    pub monthly_vacancy_loss: Decimal,
    pub effective_monthly_rent: Decimal,
    pub monthly_cash_flow: Decimal,

    // Annual figures
    pub annual_rent: Decimal,
    pub annual_expenses: Decimal,
    pub annual_cash_flow: Decimal,
    pub net_operating_income: Decimal,

    // Returns
    pub gross_yield: Decimal,
    pub net_yield: Decimal,
    pub cap_rate: Decimal,
    pub cash_on_cash: Decimal,
}
