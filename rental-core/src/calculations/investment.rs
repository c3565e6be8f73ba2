//! Buy-to-let investment calculations.
//!
//! Turns a [`CalculatorInputs`] scenario into the full set of
//! [`CalculatorResults`]: financing amounts, monthly and annual cash flows and
//! the standard return ratios.
//!
//! # Derivation
//!
//! | Figure | Formula |
//! |--------|---------|
//! | down payment | price × down% |
//! | loan amount | price − down payment |
//! | closing costs | price × 3% |
//! | total cash invested | down payment + closing costs |
//! | monthly mortgage | fixed-rate annuity on the loan amount |
//! | monthly expenses | tax/12 + insurance/12 + rent × maintenance% |
//! | vacancy loss | rent × vacancy% |
//! | monthly cash flow | rent − vacancy loss − mortgage − expenses |
//! | NOI | annual rent − annual expenses − annual vacancy loss |
//! | gross yield | annual rent / price |
//! | net yield, cap rate | NOI / price |
//! | cash on cash | annual cash flow / total cash invested |
//!
//! Nothing is rounded along the way. Ratios whose denominator is zero or
//! negative are reported as zero. Sums and products saturate at
//! [`Decimal::MAX`] / [`Decimal::MIN`] instead of overflowing.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use rental_core::CalculatorInputs;
//! use rental_core::calculations::calculate_investment;
//!
//! let results = calculate_investment(&CalculatorInputs::default());
//!
//! assert_eq!(results.down_payment, dec!(60000));
//! assert_eq!(results.loan_amount, dec!(240000));
//! assert_eq!(results.gross_yield, dec!(4.8));
//! assert_eq!(results.net_yield, results.cap_rate);
//! ```

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use tracing::{debug, warn};

use crate::calculations::common::percent_of;
use crate::models::{CalculatorInputs, CalculatorResults};

/// Closing costs assumed on every purchase, as a fraction of the price.
pub const CLOSING_COST_RATE: Decimal = dec!(0.03);

const MONTHS_PER_YEAR: Decimal = dec!(12);

fn percent(
    base: Decimal,
    pct: Decimal,
) -> Decimal {
    base.saturating_mul(pct) / Decimal::ONE_HUNDRED
}

/// Level monthly payment on a fixed-rate loan.
///
/// * A non-positive principal needs no payment.
/// * A non-positive rate spreads the principal evenly over the term.
/// * A non-positive term has no payment schedule and returns zero.
///
/// When `(1 + r)^n` grows past what a [`Decimal`] can hold, the payment has
/// converged to the interest-only amount `principal × r`, which is returned
/// instead.
///
/// ```
/// use rust_decimal_macros::dec;
/// use rental_core::calculations::monthly_mortgage;
///
/// assert_eq!(monthly_mortgage(dec!(240000), dec!(0), dec!(25)), dec!(800));
/// assert_eq!(monthly_mortgage(dec!(0), dec!(3.5), dec!(25)), dec!(0));
/// ```
pub fn monthly_mortgage(
    principal: Decimal,
    annual_rate: Decimal,
    years: Decimal,
) -> Decimal {
    if principal <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let payments = years.saturating_mul(MONTHS_PER_YEAR);
    if payments <= Decimal::ZERO {
        warn!(
            principal = %principal,
            years = %years,
            "loan term is not positive; no mortgage payment computed"
        );
        return Decimal::ZERO;
    }

    if annual_rate <= Decimal::ZERO {
        return straight_line(principal, payments);
    }

    let monthly_rate = annual_rate / Decimal::ONE_HUNDRED / MONTHS_PER_YEAR;
    let interest_only = principal.saturating_mul(monthly_rate);
    match (Decimal::ONE + monthly_rate).checked_powd(payments) {
        Some(growth) if growth > Decimal::ONE => interest_only
            .checked_mul(growth)
            .and_then(|scaled| scaled.checked_div(growth - Decimal::ONE))
            // same annuity, rearranged so the intermediate stays small
            .or_else(|| interest_only.checked_div(Decimal::ONE - Decimal::ONE / growth))
            .unwrap_or(interest_only),
        // Rate too small to register at 28 digits
        Some(_) => straight_line(principal, payments),
        None => interest_only,
    }
}

/// Principal spread evenly over `payments` (positive) instalments.
fn straight_line(
    principal: Decimal,
    payments: Decimal,
) -> Decimal {
    principal.checked_div(payments).unwrap_or(Decimal::MAX)
}

/// Computes every investment metric for one scenario.
///
/// Total over all inputs: zero, negative or extreme values never panic and
/// never produce an error.
pub fn calculate_investment(inputs: &CalculatorInputs) -> CalculatorResults {
    debug!(
        purchase_price = %inputs.purchase_price,
        monthly_rent = %inputs.monthly_rent,
        "calculating investment"
    );

    let price = inputs.purchase_price;
    if price <= Decimal::ZERO {
        warn!(
            purchase_price = %price,
            "purchase price is not positive; price-based ratios reported as zero"
        );
    }

    // Investment amounts
    let down_payment = percent(price, inputs.down_payment_percent);
    let loan_amount = price.saturating_sub(down_payment);
    let closing_costs = price.saturating_mul(CLOSING_COST_RATE);
    let total_cash_invested = down_payment.saturating_add(closing_costs);

    // Monthly figures
    let monthly_mortgage =
        monthly_mortgage(loan_amount, inputs.interest_rate, inputs.loan_term_years);
    let monthly_property_tax = inputs.property_tax_annual / MONTHS_PER_YEAR;
    let monthly_insurance = inputs.insurance_annual / MONTHS_PER_YEAR;
    let monthly_maintenance = percent(inputs.monthly_rent, inputs.maintenance_percent);
    let monthly_expenses = monthly_property_tax
        .saturating_add(monthly_insurance)
        .saturating_add(monthly_maintenance);
    let monthly_vacancy_loss = percent(inputs.monthly_rent, inputs.vacancy_percent);
    let effective_monthly_rent = inputs.monthly_rent.saturating_sub(monthly_vacancy_loss);
    let monthly_cash_flow = effective_monthly_rent
        .saturating_sub(monthly_mortgage)
        .saturating_sub(monthly_expenses);

    // Annual figures; NOI excludes debt service
    let annual_rent = inputs.monthly_rent.saturating_mul(MONTHS_PER_YEAR);
    let annual_expenses = monthly_expenses
        .saturating_mul(MONTHS_PER_YEAR)
        .saturating_add(monthly_vacancy_loss.saturating_mul(MONTHS_PER_YEAR));
    let annual_cash_flow = monthly_cash_flow.saturating_mul(MONTHS_PER_YEAR);
    let net_operating_income = annual_rent.saturating_sub(annual_expenses);

    // Returns
    let gross_yield = percent_of(annual_rent, price);
    let net_yield = percent_of(net_operating_income, price);
    let cap_rate = net_yield;
    let cash_on_cash = percent_of(annual_cash_flow, total_cash_invested);

    CalculatorResults {
        down_payment,
        loan_amount,
        closing_costs,
        total_cash_invested,
        monthly_mortgage,
        monthly_expenses,
        monthly_vacancy_loss,
        effective_monthly_rent,
        monthly_cash_flow,
        annual_rent,
        annual_expenses,
        annual_cash_flow,
        net_operating_income,
        gross_yield,
        net_yield,
        cap_rate,
        cash_on_cash,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tracing_subscriber::fmt::format::FmtSpan;

    use super::*;

    fn assert_close(
        actual: Decimal,
        expected: Decimal,
    ) {
        assert!(
            (actual - expected).abs() < dec!(0.000001),
            "expected {expected}, got {actual}"
        );
    }

    /// Initializes tracing subscriber for tests that verify log output.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_span_events(FmtSpan::NONE)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    // =========================================================================
    // monthly_mortgage tests
    // =========================================================================

    #[test]
    fn mortgage_uses_annuity_formula() {
        let payment = monthly_mortgage(dec!(240000), dec!(3.5), dec!(25));

        assert_close(payment, dec!(1201.496568622783));
    }

    #[test]
    fn mortgage_is_straight_line_at_zero_rate() {
        let payment = monthly_mortgage(dec!(240000), dec!(0), dec!(25));

        assert_eq!(payment, dec!(800));
    }

    #[test]
    fn mortgage_is_straight_line_at_negative_rate() {
        let payment = monthly_mortgage(dec!(120000), dec!(-1), dec!(10));

        assert_eq!(payment, dec!(1000));
    }

    #[test]
    fn mortgage_is_zero_without_principal() {
        assert_eq!(monthly_mortgage(dec!(0), dec!(3.5), dec!(25)), dec!(0));
        assert_eq!(monthly_mortgage(dec!(-5000), dec!(3.5), dec!(25)), dec!(0));
    }

    #[test]
    fn mortgage_is_zero_for_zero_term() {
        let _guard = init_test_tracing();

        assert_eq!(monthly_mortgage(dec!(240000), dec!(3.5), dec!(0)), dec!(0));
        assert_eq!(monthly_mortgage(dec!(240000), dec!(0), dec!(0)), dec!(0));
    }

    #[test]
    fn mortgage_repays_more_than_principal_with_interest() {
        let payment = monthly_mortgage(dec!(100000), dec!(5), dec!(30));

        assert!(payment * dec!(360) > dec!(100000));
        assert_close(payment, dec!(536.821623));
    }

    // =========================================================================
    // calculate_investment tests
    // =========================================================================

    #[test]
    fn default_scenario_matches_reference_figures() {
        let results = calculate_investment(&CalculatorInputs::default());

        assert_eq!(results.down_payment, dec!(60000));
        assert_eq!(results.loan_amount, dec!(240000));
        assert_eq!(results.closing_costs, dec!(9000));
        assert_eq!(results.total_cash_invested, dec!(69000));
        assert_eq!(results.annual_rent, dec!(14400));
        assert_eq!(results.gross_yield, dec!(4.8));
        assert_eq!(results.monthly_expenses, dec!(235));
        assert_eq!(results.monthly_vacancy_loss, dec!(60));
        assert_eq!(results.effective_monthly_rent, dec!(1140));
        assert_eq!(results.net_operating_income, dec!(10860));
        assert_eq!(results.net_yield, dec!(3.62));
        assert_close(results.monthly_mortgage, dec!(1201.496568622783));
        assert_close(results.monthly_cash_flow, dec!(-296.496568622783));
        assert_close(results.cash_on_cash, dec!(-5.156462063005));
    }

    #[test]
    fn net_yield_equals_cap_rate() {
        let inputs = CalculatorInputs {
            purchase_price: dec!(185000),
            monthly_rent: dec!(950),
            ..CalculatorInputs::default()
        };

        let results = calculate_investment(&inputs);

        assert_eq!(results.net_yield, results.cap_rate);
    }

    #[test]
    fn annual_cash_flow_is_twelve_months() {
        let results = calculate_investment(&CalculatorInputs::default());

        assert_eq!(results.monthly_cash_flow * dec!(12), results.annual_cash_flow);
    }

    #[test]
    fn gross_yield_is_annual_rent_over_price() {
        let inputs = CalculatorInputs {
            purchase_price: dec!(250000),
            monthly_rent: dec!(1250),
            ..CalculatorInputs::default()
        };

        let results = calculate_investment(&inputs);

        assert_eq!(results.gross_yield, dec!(6));
    }

    #[test]
    fn zero_interest_spreads_loan_evenly() {
        let inputs = CalculatorInputs {
            interest_rate: dec!(0),
            ..CalculatorInputs::default()
        };

        let results = calculate_investment(&inputs);

        assert_eq!(results.monthly_mortgage, dec!(800));
    }

    #[test]
    fn full_cash_purchase_has_no_mortgage() {
        let inputs = CalculatorInputs {
            down_payment_percent: dec!(100),
            ..CalculatorInputs::default()
        };

        let results = calculate_investment(&inputs);

        assert_eq!(results.loan_amount, dec!(0));
        assert_eq!(results.monthly_mortgage, dec!(0));
        // 1140 - 235 = 905 per month
        assert_eq!(results.monthly_cash_flow, dec!(905));
    }

    #[test]
    fn down_payment_above_price_has_no_mortgage() {
        let inputs = CalculatorInputs {
            down_payment_percent: dec!(120),
            ..CalculatorInputs::default()
        };

        let results = calculate_investment(&inputs);

        assert_eq!(results.loan_amount, dec!(-60000));
        assert_eq!(results.monthly_mortgage, dec!(0));
    }

    #[test]
    fn zero_price_reports_zero_ratios() {
        let _guard = init_test_tracing();
        let inputs = CalculatorInputs {
            purchase_price: dec!(0),
            ..CalculatorInputs::default()
        };

        let results = calculate_investment(&inputs);

        assert_eq!(results.gross_yield, dec!(0));
        assert_eq!(results.net_yield, dec!(0));
        assert_eq!(results.cap_rate, dec!(0));
        assert_eq!(results.cash_on_cash, dec!(0));
        assert_eq!(results.total_cash_invested, dec!(0));
        assert_eq!(results.annual_rent, dec!(14400));
    }

    #[test]
    fn negative_price_reports_zero_ratios() {
        let _guard = init_test_tracing();
        let inputs = CalculatorInputs {
            purchase_price: dec!(-100000),
            ..CalculatorInputs::default()
        };

        let results = calculate_investment(&inputs);

        assert_eq!(results.gross_yield, dec!(0));
        assert_eq!(results.cap_rate, dec!(0));
        assert_eq!(results.cash_on_cash, dec!(0));
        assert_eq!(results.monthly_mortgage, dec!(0));
    }

    #[test]
    fn zero_term_does_not_panic() {
        let _guard = init_test_tracing();
        let inputs = CalculatorInputs {
            loan_term_years: dec!(0),
            ..CalculatorInputs::default()
        };

        let results = calculate_investment(&inputs);

        assert_eq!(results.monthly_mortgage, dec!(0));
    }

    #[test]
    fn percentages_are_not_clamped() {
        let inputs = CalculatorInputs {
            vacancy_percent: dec!(150),
            ..CalculatorInputs::default()
        };

        let results = calculate_investment(&inputs);

        assert_eq!(results.monthly_vacancy_loss, dec!(1800));
        assert_eq!(results.effective_monthly_rent, dec!(-600));
    }

    #[test]
    fn huge_term_converges_to_interest_only() {
        let payment = monthly_mortgage(dec!(100000), dec!(12), dec!(100000));

        assert_close(payment, dec!(1000));
    }

    // =========================================================================
    // overflow tests
    // =========================================================================

    #[test]
    fn long_term_with_finite_growth_does_not_overflow() {
        // (1.01)^6000 fits in a Decimal but loan × rate × growth does not
        let inputs = CalculatorInputs {
            interest_rate: dec!(12),
            loan_term_years: dec!(500),
            ..CalculatorInputs::default()
        };

        let results = calculate_investment(&inputs);

        assert_close(results.monthly_mortgage, dec!(2400));
    }

    #[test]
    fn term_beyond_decimal_range_is_interest_only() {
        let payment = monthly_mortgage(dec!(240000), dec!(12), Decimal::MAX);

        assert_eq!(payment, dec!(2400));
    }

    #[test]
    fn negative_term_beyond_decimal_range_is_zero() {
        let _guard = init_test_tracing();

        assert_eq!(monthly_mortgage(dec!(240000), dec!(12), Decimal::MIN), dec!(0));
    }

    #[test]
    fn sub_month_term_at_zero_rate_saturates() {
        let tiny = dec!(0.0000000000000000000000001);

        assert_eq!(monthly_mortgage(dec!(240000), dec!(0), tiny), Decimal::MAX);
    }

    #[test]
    fn vanishing_price_reports_zero_ratios() {
        let inputs = CalculatorInputs {
            purchase_price: dec!(0.0000000000000000000000001),
            ..CalculatorInputs::default()
        };

        let results = calculate_investment(&inputs);

        assert_eq!(results.gross_yield, dec!(0));
        assert_eq!(results.net_yield, dec!(0));
        assert_eq!(results.cash_on_cash, dec!(0));
    }

    #[test]
    fn extreme_amounts_saturate() {
        let inputs = CalculatorInputs {
            purchase_price: Decimal::MAX,
            monthly_rent: Decimal::MAX,
            property_tax_annual: Decimal::MIN,
            ..CalculatorInputs::default()
        };

        let results = calculate_investment(&inputs);

        assert_eq!(results.annual_rent, Decimal::MAX);
        assert_eq!(results.net_yield, results.cap_rate);
    }
}
