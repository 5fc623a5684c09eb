use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PromoteError;
use crate::structure::WaterfallTier;
use crate::types::*;
use crate::PromoteResult;

/// Assumed GP share of the initial investment (LP contributes the rest).
const GP_COMMITMENT_PCT: Decimal = dec!(0.10);

/// Ceilings for the annualized-multiple IRR approximations.
const GP_IRR_CAP: Decimal = dec!(35);
const LP_IRR_CAP: Decimal = dec!(20);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Input for a promote waterfall distribution over yearly cash flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterfallInput {
    /// Total initial capital (GP + LP combined)
    pub investment_amount: Money,
    /// One entry per year, in order; zero entries are valid
    pub yearly_cash_flows: Vec<Money>,
    /// Promote tiers; sorted by hurdle internally
    pub tiers: Vec<WaterfallTier>,
    /// 1-based exit year; defaults to the final cash-flow entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_year: Option<u32>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Full waterfall calculation result.
///
/// A value object: it captures the structure name at calculation time and
/// holds no live reference to the stored `PromoteStructure`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterfallCalculationResult {
    /// Source structure id, when tiers came from the store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure_id: Option<String>,
    /// Structure name denormalized at calculation time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure_name: Option<String>,
    /// One row per input cash-flow entry, in input order
    pub yearly_distributions: Vec<YearlyDistribution>,
    /// Total distributions to the GP
    pub total_gp_distribution: Money,
    /// Total distributions to the LP
    pub total_lp_distribution: Money,
    /// Approximate GP IRR, percent, capped
    pub gp_irr: Percent,
    /// Approximate LP IRR, percent, capped
    pub lp_irr: Percent,
    /// GP equity multiple on its assumed 10% commitment
    pub gp_multiple: Multiple,
    /// LP equity multiple on its assumed 90% commitment
    pub lp_multiple: Multiple,
}

/// Distribution breakdown for a single year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearlyDistribution {
    /// 1-based sequence index, not a calendar year
    pub year: u32,
    pub total_cash_flow: Money,
    pub gp_distribution: Money,
    pub lp_distribution: Money,
    pub cumulative_gp: Money,
    pub cumulative_lp: Money,
    pub cumulative_total: Money,
    /// GP split actually applied this year (zero on zero-flow rows)
    pub gp_percentage: Percent,
    /// LP split actually applied this year (zero on zero-flow rows)
    pub lp_percentage: Percent,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Calculate a multi-tier promote waterfall over a yearly cash-flow series.
///
/// Tier selection is positional: the split advances one tier per year
/// (capped at the highest tier), and the exit year always takes the
/// highest-hurdle tier. This is the dashboard's simplified proxy for
/// "returns have crossed progressively higher hurdles", not a true
/// IRR-hurdle crossing test.
pub fn calculate_waterfall(
    input: &WaterfallInput,
) -> PromoteResult<ComputationOutput<WaterfallCalculationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    // --- Validation ---
    if input.investment_amount <= Decimal::ZERO {
        return Err(PromoteError::InvalidInput {
            field: "investment_amount".into(),
            reason: "Investment amount must be positive".into(),
        });
    }
    if input.yearly_cash_flows.is_empty() {
        return Err(PromoteError::InvalidInput {
            field: "yearly_cash_flows".into(),
            reason: "At least one yearly cash flow is required".into(),
        });
    }
    if input.tiers.is_empty() {
        return Err(PromoteError::InvalidInput {
            field: "tiers".into(),
            reason: "At least one waterfall tier is required".into(),
        });
    }
    if input.exit_year == Some(0) {
        return Err(PromoteError::InvalidInput {
            field: "exit_year".into(),
            reason: "Exit year must be at least 1".into(),
        });
    }

    let hundred = dec!(100);
    for tier in &input.tiers {
        if tier.gp_split + tier.lp_split != hundred {
            warnings.push(format!(
                "Tier {} splits sum to {} rather than 100; distributions will not equal cash flow",
                tier.tier_order,
                tier.gp_split + tier.lp_split,
            ));
        }
    }

    // Hurdle order is authoritative; stable sort keeps duplicate-hurdle
    // tiers in their input order.
    let mut tiers = input.tiers.clone();
    tiers.sort_by(|a, b| a.hurdle.cmp(&b.hurdle));
    let top_tier_idx = tiers.len() - 1;

    let exit_year = input
        .exit_year
        .unwrap_or(input.yearly_cash_flows.len() as u32);
    let final_idx = input.yearly_cash_flows.len() - 1;

    let mut cumulative_gp = Decimal::ZERO;
    let mut cumulative_lp = Decimal::ZERO;
    let mut cumulative_total = Decimal::ZERO;
    let mut yearly_distributions: Vec<YearlyDistribution> =
        Vec::with_capacity(input.yearly_cash_flows.len());

    for (i, &cash_flow) in input.yearly_cash_flows.iter().enumerate() {
        let year = (i + 1) as u32;

        if cash_flow.is_zero() {
            // Zero-distribution row; cumulatives carry forward unchanged
            yearly_distributions.push(YearlyDistribution {
                year,
                total_cash_flow: Decimal::ZERO,
                gp_distribution: Decimal::ZERO,
                lp_distribution: Decimal::ZERO,
                cumulative_gp,
                cumulative_lp,
                cumulative_total,
                gp_percentage: Decimal::ZERO,
                lp_percentage: Decimal::ZERO,
            });
            continue;
        }

        // Exit year (and the final entry regardless) pays at the highest
        // hurdle; earlier years advance one tier per year, capped.
        let tier = if year == exit_year || i == final_idx {
            &tiers[top_tier_idx]
        } else {
            &tiers[i.min(top_tier_idx)]
        };

        let gp_distribution = cash_flow * tier.gp_split / hundred;
        let lp_distribution = cash_flow * tier.lp_split / hundred;

        cumulative_gp += gp_distribution;
        cumulative_lp += lp_distribution;
        cumulative_total += cash_flow;

        yearly_distributions.push(YearlyDistribution {
            year,
            total_cash_flow: cash_flow,
            gp_distribution,
            lp_distribution,
            cumulative_gp,
            cumulative_lp,
            cumulative_total,
            gp_percentage: tier.gp_split,
            lp_percentage: tier.lp_split,
        });
    }

    let total_gp_distribution = cumulative_gp;
    let total_lp_distribution = cumulative_lp;

    // Approximate return metrics on a fixed 10/90 GP/LP contribution split.
    // Annualized-multiple shortcuts with plausibility caps, not a DCF solve.
    let gp_investment = input.investment_amount * GP_COMMITMENT_PCT;
    let lp_investment = input.investment_amount - gp_investment;
    let gp_multiple = total_gp_distribution / gp_investment;
    let lp_multiple = total_lp_distribution / lp_investment;

    let exit_years = Decimal::from(exit_year);
    let gp_irr = ((gp_multiple - Decimal::ONE) * hundred / exit_years).min(GP_IRR_CAP);
    let lp_irr = ((lp_multiple - Decimal::ONE) * hundred / exit_years).min(LP_IRR_CAP);

    let result = WaterfallCalculationResult {
        structure_id: None,
        structure_name: None,
        yearly_distributions,
        total_gp_distribution,
        total_lp_distribution,
        gp_irr,
        lp_irr,
        gp_multiple,
        lp_multiple,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Promote Waterfall (positional tier advance, approximate IRR)",
        &serde_json::json!({
            "investment_amount": input.investment_amount.to_string(),
            "num_years": input.yearly_cash_flows.len(),
            "num_tiers": input.tiers.len(),
            "exit_year": exit_year,
            "gp_commitment_pct": GP_COMMITMENT_PCT.to_string(),
        }),
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
