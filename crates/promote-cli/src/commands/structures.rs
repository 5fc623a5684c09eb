use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use promote_core::structure::{PromoteStructureStore, WaterfallTier};

use crate::input;

/// File/stdin body for structure creation.
#[derive(Deserialize)]
struct CreateStructureRequest {
    deal_id: String,
    name: String,
    tiers: Vec<WaterfallTier>,
}

/// Arguments for creating a promote structure
#[derive(Args)]
pub struct CreateStructureArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Owning deal id
    #[arg(long)]
    pub deal_id: Option<String>,

    /// Structure name
    #[arg(long)]
    pub name: Option<String>,

    /// Path to a JSON file holding the tier list
    #[arg(long)]
    pub tiers_file: Option<String>,
}

pub fn run_create(
    args: CreateStructureArgs,
    store_path: &str,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request: CreateStructureRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let deal_id = args
            .deal_id
            .ok_or("--deal-id is required (or provide --input)")?;
        let name = args.name.ok_or("--name is required (or provide --input)")?;
        let tiers_file = args
            .tiers_file
            .ok_or("--tiers-file is required (or provide --input)")?;
        let tiers: Vec<WaterfallTier> = input::file::read_json(&tiers_file)?;
        CreateStructureRequest {
            deal_id,
            name,
            tiers,
        }
    };

    let mut store = PromoteStructureStore::load(store_path)?;
    let structure = store.create(&request.deal_id, &request.name, request.tiers)?;
    store.save(store_path)?;
    Ok(serde_json::to_value(structure)?)
}

/// Arguments for listing a deal's promote structures
#[derive(Args)]
pub struct ListStructuresArgs {
    /// Owning deal id
    #[arg(long)]
    pub deal_id: String,
}

pub fn run_list(
    args: ListStructuresArgs,
    store_path: &str,
) -> Result<Value, Box<dyn std::error::Error>> {
    let store = PromoteStructureStore::load(store_path)?;
    Ok(serde_json::to_value(store.list(&args.deal_id))?)
}

/// Arguments for deleting a promote structure
#[derive(Args)]
pub struct DeleteStructureArgs {
    /// Structure id to delete
    #[arg(long)]
    pub id: String,
}

pub fn run_delete(
    args: DeleteStructureArgs,
    store_path: &str,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut store = PromoteStructureStore::load(store_path)?;
    let removed = store.delete(&args.id)?;
    store.save(store_path)?;
    Ok(serde_json::to_value(removed)?)
}
