use promote_core::service::{
    CalculationRequest, DealWaterfallService, WaterfallRequest,
};
use promote_core::structure::{PromoteStructureStore, WaterfallTier};
use promote_core::waterfall::{self, WaterfallInput};
use promote_core::PromoteError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Helpers
// ===========================================================================

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

// ===========================================================================
// End-to-end: store -> service -> calculation
// ===========================================================================

#[test]
fn test_structure_lifecycle_through_service() {
    let mut service = DealWaterfallService::new(PromoteStructureStore::new());

    let base = service
        .create_structure("deal-42", "Base Promote", standard_tiers())
        .unwrap();
    service
        .create_structure("deal-42", "Aggressive Promote", standard_tiers())
        .unwrap();

    let listed = service.list_structures("deal-42");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].name, "Base Promote");

    service.delete_structure(&base.id).unwrap();
    assert_eq!(service.list_structures("deal-42").len(), 1);

    // Deleting again is NotFound
    assert!(matches!(
        service.delete_structure(&base.id),
        Err(PromoteError::NotFound { .. })
    ));
}

#[test]
fn test_deleting_structure_does_not_invalidate_prior_results() {
    let mut service = DealWaterfallService::new(PromoteStructureStore::new());
    let structure = service
        .create_structure("deal-1", "Base Promote", standard_tiers())
        .unwrap();

    let request = CalculationRequest::ByStructureId(structure.id.clone());
    let output = service.calculate("deal-1", &request).unwrap();

    service.delete_structure(&structure.id).unwrap();

    // The result is a value object; it keeps its denormalized snapshot
    assert_eq!(output.result.structure_name.as_deref(), Some("Base Promote"));
    assert_eq!(output.result.total_gp_distribution, dec!(555_000));

    // But a fresh calculation against the deleted id now fails
    assert!(matches!(
        service.calculate("deal-1", &request),
        Err(PromoteError::NotFound { .. })
    ));
}

#[test]
fn test_persisted_store_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("promote-structures.json");

    {
        let mut store = PromoteStructureStore::new();
        store
            .create("deal-7", "Persisted Promote", standard_tiers())
            .unwrap();
        store.save(&path).unwrap();
    }

    let store = PromoteStructureStore::load(&path).unwrap();
    let service = DealWaterfallService::new(store);
    let output = service
        .calculate("deal-7", &CalculationRequest::ByStructureId("ps-1".into()))
        .unwrap();
    assert_eq!(
        output.result.structure_name.as_deref(),
        Some("Persisted Promote")
    );
}

// ===========================================================================
// Calculation contract
// ===========================================================================

#[test]
fn test_worked_example_totals() {
    // The dashboard's demo scenario: 1M investment, five yearly flows,
    // exit in year 5.
    let input = WaterfallInput {
        investment_amount: dec!(1_000_000),
        yearly_cash_flows: vec![
            dec!(100_000),
            dec!(120_000),
            dec!(130_000),
            dec!(140_000),
            dec!(1_500_000),
        ],
        tiers: standard_tiers(),
        exit_year: Some(5),
    };
    let output = waterfall::calculate_waterfall(&input).unwrap();
    let out = &output.result;

    assert_eq!(out.total_gp_distribution, dec!(555_000));
    assert_eq!(out.total_lp_distribution, dec!(1_435_000));
    assert_eq!(out.gp_multiple, dec!(5.55));
    assert_eq!(out.gp_irr, dec!(35));
    assert!((out.lp_irr - dec!(11.8889)).abs() < dec!(0.001));
}

#[test]
fn test_negative_flows_still_balance() {
    // A capital-call year mid-hold: distributions go negative but the sum
    // invariant holds.
    let input = WaterfallInput {
        investment_amount: dec!(1_000_000),
        yearly_cash_flows: vec![dec!(100_000), dec!(-50_000), dec!(900_000)],
        tiers: standard_tiers(),
        exit_year: None,
    };
    let output = waterfall::calculate_waterfall(&input).unwrap();
    let out = &output.result;

    let distributed: Decimal = out
        .yearly_distributions
        .iter()
        .map(|y| y.gp_distribution + y.lp_distribution)
        .sum();
    assert_eq!(distributed, dec!(950_000));
    assert_eq!(out.yearly_distributions.len(), 3);
}

#[test]
fn test_result_wire_shape() {
    let service = DealWaterfallService::new(PromoteStructureStore::new());
    let request = CalculationRequest::Inline(WaterfallRequest {
        tiers: standard_tiers(),
        investment_amount: dec!(1_000_000),
        yearly_cash_flows: vec![dec!(100_000), dec!(900_000)],
        exit_year: None,
    });
    let output = service.calculate("deal-1", &request).unwrap();
    let value = serde_json::to_value(&output).unwrap();

    // Envelope fields
    assert!(value.get("methodology").is_some());
    assert!(value.get("metadata").is_some());

    let result = value.get("result").unwrap();
    // Inline calculations carry no structure reference at all
    assert!(result.get("structure_id").is_none());
    assert!(result.get("structure_name").is_none());
    assert_eq!(
        result["yearly_distributions"].as_array().unwrap().len(),
        2
    );
    // Decimal fields travel as strings
    assert!(result["total_gp_distribution"].is_string());
}
