use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use promote_core::service::{CalculationRequest, DealWaterfallService};
use promote_core::structure::{PromoteStructureStore, WaterfallTier};
use promote_core::waterfall::{self, WaterfallInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Stateless calculation
// ---------------------------------------------------------------------------

/// Run a waterfall calculation with everything supplied inline. The host
/// dashboard keeps its own structure storage and passes the tier list here.
#[napi]
pub fn calculate_waterfall(input_json: String) -> NapiResult<String> {
    let input: WaterfallInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = waterfall::calculate_waterfall(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Store-backed operations
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CreateStructureRequest {
    deal_id: String,
    name: String,
    tiers: Vec<WaterfallTier>,
}

#[napi]
pub fn list_waterfall_structures(store_path: String, deal_id: String) -> NapiResult<String> {
    let store = PromoteStructureStore::load(&store_path).map_err(to_napi_error)?;
    serde_json::to_string(&store.list(&deal_id)).map_err(to_napi_error)
}

#[napi]
pub fn create_waterfall_structure(store_path: String, input_json: String) -> NapiResult<String> {
    let request: CreateStructureRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let mut store = PromoteStructureStore::load(&store_path).map_err(to_napi_error)?;
    let structure = store
        .create(&request.deal_id, &request.name, request.tiers)
        .map_err(to_napi_error)?;
    store.save(&store_path).map_err(to_napi_error)?;
    serde_json::to_string(&structure).map_err(to_napi_error)
}

/// Run a calculation for a deal against the store. `request_json` is either
/// a bare structure-id string or an inline request object.
#[napi]
pub fn calculate_waterfall_for_deal(
    store_path: String,
    deal_id: String,
    request_json: String,
) -> NapiResult<String> {
    let request: CalculationRequest =
        serde_json::from_str(&request_json).map_err(to_napi_error)?;
    let store = PromoteStructureStore::load(&store_path).map_err(to_napi_error)?;
    let service = DealWaterfallService::new(store);
    let output = service.calculate(&deal_id, &request).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
