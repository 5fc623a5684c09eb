use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PromoteError;
use crate::structure::{PromoteStructure, PromoteStructureStore, WaterfallTier};
use crate::types::{ComputationOutput, Money};
use crate::waterfall::{self, WaterfallCalculationResult, WaterfallInput};
use crate::PromoteResult;

// ---------------------------------------------------------------------------
// Calculation request
// ---------------------------------------------------------------------------

/// The historical calculation API accepted either a bare structure-id string
/// or a full inline request object. Modeled as a tagged variant; serde's
/// untagged representation keeps the wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalculationRequest {
    /// Tiers from a stored structure; investment and cash flows from the
    /// deal-assumptions provider
    ByStructureId(String),
    /// Everything supplied inline
    Inline(WaterfallRequest),
}

/// Inline calculation request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterfallRequest {
    pub tiers: Vec<WaterfallTier>,
    pub investment_amount: Money,
    pub yearly_cash_flows: Vec<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_year: Option<u32>,
}

// ---------------------------------------------------------------------------
// Deal assumptions
// ---------------------------------------------------------------------------

/// Investment figures for a deal, used when a calculation references a
/// stored structure without supplying its own cash flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealAssumptions {
    pub investment_amount: Money,
    pub yearly_cash_flows: Vec<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_year: Option<u32>,
}

/// Source of per-deal investment assumptions.
pub trait DealAssumptionsProvider {
    fn assumptions(&self, deal_id: &str) -> Option<DealAssumptions>;
}

/// Fixed assumptions for every deal. Stands in for the dashboard's demo
/// figures when no underwriting data is wired up.
#[derive(Debug, Clone)]
pub struct StaticAssumptions {
    defaults: DealAssumptions,
}

impl StaticAssumptions {
    pub fn new(defaults: DealAssumptions) -> Self {
        Self { defaults }
    }
}

impl Default for StaticAssumptions {
    fn default() -> Self {
        Self {
            defaults: DealAssumptions {
                investment_amount: dec!(1_000_000),
                yearly_cash_flows: vec![
                    dec!(100_000),
                    dec!(120_000),
                    dec!(130_000),
                    dec!(140_000),
                    dec!(1_500_000),
                ],
                exit_year: Some(5),
            },
        }
    }
}

impl DealAssumptionsProvider for StaticAssumptions {
    fn assumptions(&self, _deal_id: &str) -> Option<DealAssumptions> {
        Some(self.defaults.clone())
    }
}

/// Try a primary provider, fall back to a secondary. One explicit seam in
/// place of mock-data substitution scattered through call sites.
#[derive(Debug, Clone)]
pub struct FallbackAssumptions<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackAssumptions<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P, F> DealAssumptionsProvider for FallbackAssumptions<P, F>
where
    P: DealAssumptionsProvider,
    F: DealAssumptionsProvider,
{
    fn assumptions(&self, deal_id: &str) -> Option<DealAssumptions> {
        self.primary
            .assumptions(deal_id)
            .or_else(|| self.fallback.assumptions(deal_id))
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Store plus calculator behind the host-facing operations. Transport is the
/// host's concern; this is a plain in-process API.
pub struct DealWaterfallService<A = StaticAssumptions> {
    store: PromoteStructureStore,
    assumptions: A,
}

impl DealWaterfallService<StaticAssumptions> {
    pub fn new(store: PromoteStructureStore) -> Self {
        Self {
            store,
            assumptions: StaticAssumptions::default(),
        }
    }
}

impl<A: DealAssumptionsProvider> DealWaterfallService<A> {
    pub fn with_assumptions(store: PromoteStructureStore, assumptions: A) -> Self {
        Self { store, assumptions }
    }

    pub fn store(&self) -> &PromoteStructureStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PromoteStructureStore {
        &mut self.store
    }

    pub fn list_structures(&self, deal_id: &str) -> Vec<&PromoteStructure> {
        self.store.list(deal_id)
    }

    pub fn create_structure(
        &mut self,
        deal_id: &str,
        name: &str,
        tiers: Vec<WaterfallTier>,
    ) -> PromoteResult<PromoteStructure> {
        self.store.create(deal_id, name, tiers)
    }

    pub fn delete_structure(&mut self, id: &str) -> PromoteResult<PromoteStructure> {
        self.store.delete(id)
    }

    /// Run a waterfall calculation for a deal. Structure-id requests resolve
    /// tiers against the store and denormalize the structure's id and name
    /// into the result; inline requests run as supplied.
    pub fn calculate(
        &self,
        deal_id: &str,
        request: &CalculationRequest,
    ) -> PromoteResult<ComputationOutput<WaterfallCalculationResult>> {
        match request {
            CalculationRequest::ByStructureId(structure_id) => {
                let structure =
                    self.store
                        .get(structure_id)
                        .ok_or_else(|| PromoteError::NotFound {
                            entity: "Promote structure".into(),
                            id: structure_id.clone(),
                        })?;
                let assumptions = self.assumptions.assumptions(deal_id).ok_or_else(|| {
                    PromoteError::InvalidInput {
                        field: "deal_id".into(),
                        reason: format!("No investment assumptions available for deal '{deal_id}'"),
                    }
                })?;

                let input = WaterfallInput {
                    investment_amount: assumptions.investment_amount,
                    yearly_cash_flows: assumptions.yearly_cash_flows,
                    tiers: structure.tiers.clone(),
                    exit_year: assumptions.exit_year,
                };
                let mut output = waterfall::calculate_waterfall(&input)?;
                output.result.structure_id = Some(structure.id.clone());
                output.result.structure_name = Some(structure.name.clone());
                Ok(output)
            }
            CalculationRequest::Inline(req) => {
                let input = WaterfallInput {
                    investment_amount: req.investment_amount,
                    yearly_cash_flows: req.yearly_cash_flows.clone(),
                    tiers: req.tiers.clone(),
                    exit_year: req.exit_year,
                };
                waterfall::calculate_waterfall(&input)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PromoteError;
    use rust_decimal_macros::dec;

    fn standard_tiers() -> Vec<WaterfallTier> {
        vec![
            WaterfallTier {
                tier_order: 1,
                hurdle: dec!(8),
                gp_split: dec!(0),
                lp_split: dec!(100),
            },
            WaterfallTier {
                tier_order: 2,
                hurdle: dec!(12),
                gp_split: dec!(20),
                lp_split: dec!(80),
            },
            WaterfallTier {
                tier_order: 3,
                hurdle: dec!(15),
                gp_split: dec!(30),
                lp_split: dec!(70),
            },
        ]
    }

    #[test]
    fn test_calculate_by_structure_id() {
        let mut service = DealWaterfallService::new(PromoteStructureStore::new());
        let structure = service
            .create_structure("deal-1", "Base Promote", standard_tiers())
            .unwrap();

        let request = CalculationRequest::ByStructureId(structure.id.clone());
        let output = service.calculate("deal-1", &request).unwrap();
        let out = &output.result;

        // Denormalized at calculation time
        assert_eq!(out.structure_id.as_deref(), Some(structure.id.as_str()));
        assert_eq!(out.structure_name.as_deref(), Some("Base Promote"));

        // Default demo assumptions drive the figures
        assert_eq!(out.total_gp_distribution, dec!(555_000));
        assert_eq!(out.total_lp_distribution, dec!(1_435_000));
    }

    #[test]
    fn test_calculate_inline() {
        let service = DealWaterfallService::new(PromoteStructureStore::new());
        let request = CalculationRequest::Inline(WaterfallRequest {
            tiers: standard_tiers(),
            investment_amount: dec!(1_000_000),
            yearly_cash_flows: vec![dec!(100_000), dec!(900_000)],
            exit_year: None,
        });
        let output = service.calculate("deal-1", &request).unwrap();
        let out = &output.result;

        assert!(out.structure_id.is_none());
        assert!(out.structure_name.is_none());
        // Year 1 at 0/100, year 2 final at 30/70
        assert_eq!(out.total_gp_distribution, dec!(270_000));
        assert_eq!(out.total_lp_distribution, dec!(730_000));
    }

    #[test]
    fn test_unknown_structure_id_is_not_found() {
        let service = DealWaterfallService::new(PromoteStructureStore::new());
        let request = CalculationRequest::ByStructureId("ps-404".into());
        let err = service.calculate("deal-1", &request).unwrap_err();
        match err {
            PromoteError::NotFound { id, .. } => assert_eq!(id, "ps-404"),
            other => panic!("Expected NotFound, got: {other:?}"),
        }
    }

    #[test]
    fn test_request_union_wire_shape() {
        // Bare string deserializes to the structure-id variant
        let by_id: CalculationRequest = serde_json::from_str(r#""ps-1""#).unwrap();
        assert!(matches!(by_id, CalculationRequest::ByStructureId(ref id) if id == "ps-1"));

        // Object deserializes to the inline variant
        let inline: CalculationRequest = serde_json::from_str(
            r#"{
                "tiers": [
                    {"tier_order": 1, "hurdle": "8", "gp_split": "0", "lp_split": "100"}
                ],
                "investment_amount": "1000000",
                "yearly_cash_flows": ["100000", "200000"],
                "exit_year": 2
            }"#,
        )
        .unwrap();
        match inline {
            CalculationRequest::Inline(req) => {
                assert_eq!(req.tiers.len(), 1);
                assert_eq!(req.investment_amount, dec!(1_000_000));
                assert_eq!(req.exit_year, Some(2));
            }
            other => panic!("Expected inline request, got: {other:?}"),
        }
    }

    /// Provider that only knows one deal; used to exercise the fallback.
    struct SingleDeal {
        deal_id: String,
        assumptions: DealAssumptions,
    }

    impl DealAssumptionsProvider for SingleDeal {
        fn assumptions(&self, deal_id: &str) -> Option<DealAssumptions> {
            (deal_id == self.deal_id).then(|| self.assumptions.clone())
        }
    }

    #[test]
    fn test_fallback_provider_precedence() {
        let primary = SingleDeal {
            deal_id: "deal-1".into(),
            assumptions: DealAssumptions {
                investment_amount: dec!(2_000_000),
                yearly_cash_flows: vec![dec!(500_000)],
                exit_year: None,
            },
        };
        let provider = FallbackAssumptions::new(primary, StaticAssumptions::default());

        // Known deal: primary wins
        let known = provider.assumptions("deal-1").unwrap();
        assert_eq!(known.investment_amount, dec!(2_000_000));

        // Unknown deal: static defaults
        let unknown = provider.assumptions("deal-2").unwrap();
        assert_eq!(unknown.investment_amount, dec!(1_000_000));
        assert_eq!(unknown.exit_year, Some(5));
    }

    #[test]
    fn test_by_structure_id_uses_primary_assumptions() {
        let primary = SingleDeal {
            deal_id: "deal-1".into(),
            assumptions: DealAssumptions {
                investment_amount: dec!(1_000_000),
                yearly_cash_flows: vec![dec!(400_000), dec!(600_000)],
                exit_year: None,
            },
        };
        let provider = FallbackAssumptions::new(primary, StaticAssumptions::default());
        let mut service =
            DealWaterfallService::with_assumptions(PromoteStructureStore::new(), provider);
        let structure = service
            .create_structure("deal-1", "Underwritten", standard_tiers())
            .unwrap();

        let output = service
            .calculate("deal-1", &CalculationRequest::ByStructureId(structure.id))
            .unwrap();
        // Year 1 at 0/100, year 2 final at 30/70 of 600k
        assert_eq!(output.result.total_gp_distribution, dec!(180_000));
    }
}
