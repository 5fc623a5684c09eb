use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use promote_core::service::{CalculationRequest, DealWaterfallService, WaterfallRequest};
use promote_core::structure::{PromoteStructureStore, WaterfallTier};

use crate::input;

/// Arguments for a waterfall distribution calculation
#[derive(Args)]
pub struct CalculateArgs {
    /// Deal the calculation runs against
    #[arg(long)]
    pub deal_id: String,

    /// Path to a JSON input file holding the calculation request
    /// (either a bare structure-id string or an inline request object)
    #[arg(long)]
    pub input: Option<String>,

    /// Stored structure id to calculate against
    #[arg(long)]
    pub structure_id: Option<String>,

    /// Total initial investment
    #[arg(long)]
    pub investment: Option<Decimal>,

    /// Yearly cash flows (comma-separated, e.g. "100000,120000,1500000")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Option<Vec<Decimal>>,

    /// Path to a JSON file holding the tier list (inline calculation)
    #[arg(long)]
    pub tiers_file: Option<String>,

    /// 1-based exit year (defaults to the final cash-flow entry)
    #[arg(long)]
    pub exit_year: Option<u32>,
}

pub fn run_calculate(
    args: CalculateArgs,
    store_path: &str,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request: CalculationRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else if let Some(structure_id) = args.structure_id {
        CalculationRequest::ByStructureId(structure_id)
    } else {
        let investment = args
            .investment
            .ok_or("--investment is required for inline calculations (or provide --structure-id / --input)")?;
        let cash_flows = args
            .cash_flows
            .ok_or("--cash-flows is required for inline calculations")?;
        let tiers_file = args
            .tiers_file
            .ok_or("--tiers-file is required for inline calculations")?;
        let tiers: Vec<WaterfallTier> = input::file::read_json(&tiers_file)?;
        CalculationRequest::Inline(WaterfallRequest {
            tiers,
            investment_amount: investment,
            yearly_cash_flows: cash_flows,
            exit_year: args.exit_year,
        })
    };

    let store = PromoteStructureStore::load(store_path)?;
    let service = DealWaterfallService::new(store);
    let result = service.calculate(&args.deal_id, &request)?;
    Ok(serde_json::to_value(result)?)
}
