//! Property-based tests for the dialogue engine
//!
//! These tests verify key invariants hold across arbitrary states and input.

use super::transition::TransitionResult;
use super::*;
use crate::runtime::testing::MockCatalog;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_catalog() -> MockCatalog {
    MockCatalog::new()
        .with_material("Cabo 2.5mm", "M-001", "Elétricos")
        .with_material("Tomada 10A", "M-002", "Elétricos")
        .with_material("Martelo", "M-010", "Ferramentas")
        .with_supplier("Acme", "F-1", "são paulo")
        .with_supplier("Beta", "F-2", "minas gerais (betim)")
        .with_supplier("Gama", "F-3", "minas gerais (extrema)")
        .with_price("Acme", "Cabo 2.5mm", 12.5)
        .with_price("Beta", "Cabo 2.5mm", 10.0)
        .with_price("Gama", "Martelo", 31.0)
}

fn step(
    store: &MockCatalog,
    state: &ConversationState,
    text: &str,
) -> Result<TransitionResult, TransitionError> {
    let regions = RegionTable::from_store(store)?;
    let ctx = TurnContext::new(store, &regions);
    transition(state, &ctx, &Utterance::new(text))
}

/// Prices shown in a quote reply, in display order
fn listed_prices(reply: &str) -> Vec<f64> {
    reply
        .lines()
        .filter_map(|line| {
            let (_, rest) = line.split_once("R$ ")?;
            let (price, _) = rest.split_once(" (")?;
            price.parse().ok()
        })
        .collect()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_word() -> impl Strategy<Value = String> {
    "[a-zà-ú]{1,12}"
}

fn arb_menu() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(arb_word(), 0..6)
}

fn arb_stage() -> impl Strategy<Value = Stage> {
    prop_oneof![
        Just(Stage::AwaitingCategory),
        arb_menu().prop_map(|categories| Stage::AwaitingCategoryChoice { categories }),
        (proptest::option::of(arb_word()), arb_menu()).prop_map(|(category, materials)| {
            Stage::AwaitingMaterialChoice {
                category,
                materials,
            }
        }),
        (proptest::option::of(arb_word()), arb_word())
            .prop_map(|(category, material)| Stage::AwaitingState { category, material }),
        (
            proptest::option::of(arb_word()),
            arb_word(),
            proptest::option::of(arb_word()),
        )
            .prop_map(|(category, material, region)| {
                Stage::AwaitingRegionDisambiguation {
                    category,
                    material,
                    region,
                }
            }),
        (
            proptest::option::of(arb_word()),
            proptest::option::of(arb_word()),
            proptest::option::of(arb_word()),
        )
            .prop_map(|(category, material, region)| Stage::QueryFinished {
                category,
                material,
                region,
            }),
        "[a-zA-Z !]{0,30}".prop_map(|last_reply| Stage::Ended { last_reply }),
    ]
}

fn arb_state() -> impl Strategy<Value = ConversationState> {
    (arb_stage(), any::<bool>()).prop_map(|(stage, greeting_sent)| {
        ConversationState::new(stage, greeting_sent)
    })
}

fn arb_non_ended_state() -> impl Strategy<Value = ConversationState> {
    arb_state().prop_filter("conversation still open", |s| !s.is_ended())
}

fn arb_utterance() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("oi".to_string()),
        Just("sim".to_string()),
        Just("não".to_string()),
        Just("reiniciar".to_string()),
        Just("MG".to_string()),
        Just("betim".to_string()),
        Just("São Paulo".to_string()),
        Just("cabo".to_string()),
        Just(String::new()),
        "[0-9]{1,3}",
        "[a-zA-Zà-úÀ-Ú0-9 ]{0,25}",
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Any utterance sequence from any state yields a reply, never an error
    #[test]
    fn prop_transition_total(
        initial in arb_state(),
        inputs in proptest::collection::vec(arb_utterance(), 1..12),
    ) {
        let store = test_catalog();
        let mut state = initial;
        for input in inputs {
            let was_ended = state.is_ended();
            let result = step(&store, &state, &input);
            prop_assert!(result.is_ok());
            let result = result.unwrap();
            prop_assert!(!result.reply.is_empty() || was_ended);
            if was_ended {
                prop_assert!(result.new_state.is_ended());
            }
            // Every next state survives persistence
            let reloaded = ConversationState::try_from(result.new_state.to_snapshot());
            prop_assert_eq!(reloaded.as_ref(), Ok(&result.new_state));
            state = result.new_state;
        }
    }

    // Restart keywords reset every open conversation
    #[test]
    fn prop_restart_resets(
        state in arb_non_ended_state(),
        prefix in "[a-z ]{0,8}",
        suffix in "[a-z ]{0,8}",
    ) {
        let store = test_catalog();
        let text = format!("{prefix}reiniciar{suffix}");
        let result = step(&store, &state, &text).unwrap();

        prop_assert_eq!(result.new_state, ConversationState::new(Stage::AwaitingCategory, true));
        prop_assert!(result.reply.starts_with("Entendido! Vamos reiniciar a conversa."));
    }

    // An ended conversation replays its last reply, whatever is said
    #[test]
    fn prop_ended_replays(
        last_reply in "[a-zA-Z !]{1,30}",
        greeting_sent in any::<bool>(),
        inputs in proptest::collection::vec(arb_utterance(), 1..5),
    ) {
        let store = test_catalog();
        let state = ConversationState::new(Stage::Ended { last_reply: last_reply.clone() }, greeting_sent);
        for input in inputs {
            let result = step(&store, &state, &input).unwrap();
            prop_assert_eq!(&result.new_state, &state);
            prop_assert_eq!(&result.reply, &last_reply);
        }
    }

    // Index and name select the same menu entry
    #[test]
    fn prop_index_and_name_agree(
        items in proptest::collection::vec("[a-z]{3,10}", 1..8),
        pick in any::<proptest::sample::Index>(),
    ) {
        let i = pick.index(items.len());
        let by_index = Utterance::new(&(i + 1).to_string()).select(&items).cloned();
        prop_assert_eq!(by_index.as_ref(), Some(&items[i]));

        // The first entry containing the name; only earlier entries can shadow it
        let by_name = Utterance::new(&items[i].to_uppercase()).select(&items).cloned();
        let first = items.iter().position(|item| item.contains(items[i].as_str()));
        prop_assert_eq!(by_name, first.map(|p| items[p].clone()));
        prop_assert!(first.is_some_and(|p| p <= i));
    }

    // At most three quotes, cheapest first
    #[test]
    fn prop_quotes_ranked(
        prices in proptest::collection::vec(0.0f64..10_000.0, 0..8),
    ) {
        let mut store = MockCatalog::new().with_material("Cabo", "M-1", "Elétricos");
        for (i, price) in prices.iter().enumerate() {
            let name = format!("Forn{i}");
            store = store
                .with_supplier(&name, &format!("F-{i}"), "são paulo")
                .with_price(&name, "Cabo", *price);
        }

        let state = ConversationState::new(
            Stage::AwaitingState { category: None, material: "cabo".to_string() },
            true,
        );
        let result = step(&store, &state, "sp").unwrap();
        let listed = listed_prices(&result.reply);

        prop_assert_eq!(listed.len(), prices.len().min(3));
        prop_assert!(listed.windows(2).all(|w| w[0] <= w[1]));
        if prices.is_empty() {
            prop_assert_eq!(result.new_state.stage_name(), StageName::AwaitingState);
        } else {
            prop_assert_eq!(result.new_state.stage_name(), StageName::QueryFinished);
        }
    }

    // Typed state survives the flat wire form and JSON unchanged
    #[test]
    fn prop_snapshot_roundtrip(state in arb_state()) {
        let json = serde_json::to_string(&state.to_snapshot()).unwrap();
        let snapshot: StateSnapshot = serde_json::from_str(&json).unwrap();
        let back = ConversationState::try_from(snapshot).unwrap();
        prop_assert_eq!(back, state);
    }
}
