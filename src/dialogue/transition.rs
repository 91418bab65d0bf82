//! Stage transition function
//!
//! Given the current state, the turn's catalog view and the user's text,
//! produce the reply and the next state. Catalog reads are the only I/O, and
//! the input state is never mutated.

use super::region::{RegionMatch, RegionTable};
use super::reply;
use super::state::{ConversationState, Stage};
use super::utterance::Utterance;
use crate::catalog::{CatalogError, MAX_QUOTES};
use crate::runtime::CatalogStore;
use std::collections::HashSet;
use thiserror::Error;

/// What a turn can see besides the conversation state
pub struct TurnContext<'a, S: ?Sized> {
    pub store: &'a S,
    pub regions: &'a RegionTable,
}

impl<'a, S: CatalogStore + ?Sized> TurnContext<'a, S> {
    pub fn new(store: &'a S, regions: &'a RegionTable) -> Self {
        Self { store, regions }
    }
}

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConversationState,
    pub reply: String,
}

impl TransitionResult {
    pub fn new(state: ConversationState, reply: impl Into<String>) -> Self {
        Self {
            new_state: state,
            reply: reply.into(),
        }
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Advance the conversation by one user utterance
pub fn transition<S: CatalogStore + ?Sized>(
    state: &ConversationState,
    ctx: &TurnContext<'_, S>,
    utterance: &Utterance,
) -> Result<TransitionResult, TransitionError> {
    let greeting_sent = state.greeting_sent;
    let keep = |stage: Stage| ConversationState::new(stage, greeting_sent);

    match &state.stage {
        // Closed conversations only replay their last word
        Stage::Ended { last_reply } => Ok(TransitionResult::new(state.clone(), last_reply.clone())),

        _ if utterance.is_restart() => {
            let categories = list_categories(ctx.store)?;
            Ok(TransitionResult::new(
                ConversationState::new(Stage::AwaitingCategory, true),
                reply::restart(&categories),
            ))
        }

        // ============================================================
        // Wrap-up
        // ============================================================
        Stage::QueryFinished { .. } if utterance.is_yes() => {
            let categories = list_categories(ctx.store)?;
            Ok(TransitionResult::new(
                ConversationState::new(Stage::AwaitingCategory, true),
                reply::new_query(&categories),
            ))
        }

        Stage::QueryFinished { .. } if utterance.is_no() => Ok(TransitionResult::new(
            keep(Stage::Ended {
                last_reply: reply::FAREWELL.to_string(),
            }),
            reply::FAREWELL,
        )),

        Stage::QueryFinished { .. } => {
            Ok(TransitionResult::new(state.clone(), reply::YES_NO_REPROMPT))
        }

        // ============================================================
        // Category
        // ============================================================
        Stage::AwaitingCategory => {
            let greet = !greeting_sent || utterance.is_greeting();
            let categories = list_categories(ctx.store)?;
            if categories.is_empty() {
                return Ok(TransitionResult::new(
                    ConversationState::new(Stage::AwaitingCategory, true),
                    reply::NO_CATEGORIES_RETRY_LATER,
                ));
            }
            let text = reply::category_prompt(greet, &categories);
            Ok(TransitionResult::new(
                ConversationState::new(Stage::AwaitingCategoryChoice { categories }, true),
                text,
            ))
        }

        Stage::AwaitingCategoryChoice { categories } => {
            let Some(category) = utterance.select(categories) else {
                return Ok(TransitionResult::new(
                    state.clone(),
                    reply::CATEGORY_REPROMPT,
                ));
            };

            let materials = list_materials(ctx.store, category)?;
            if materials.is_empty() {
                let categories = list_categories(ctx.store)?;
                return Ok(TransitionResult::new(
                    keep(Stage::AwaitingCategory),
                    reply::no_materials(category, &categories),
                ));
            }

            let text = reply::materials_menu(category, &materials);
            Ok(TransitionResult::new(
                keep(Stage::AwaitingMaterialChoice {
                    category: Some(category.clone()),
                    materials,
                }),
                text,
            ))
        }

        // ============================================================
        // Material
        // ============================================================
        Stage::AwaitingMaterialChoice {
            category,
            materials,
        } => match utterance.select(materials) {
            Some(material) => Ok(TransitionResult::new(
                keep(Stage::AwaitingState {
                    category: category.clone(),
                    material: material.clone(),
                }),
                reply::state_prompt(material),
            )),
            None => Ok(TransitionResult::new(
                state.clone(),
                reply::MATERIAL_REPROMPT,
            )),
        },

        // ============================================================
        // Region
        // ============================================================
        Stage::AwaitingState { category, material } => match ctx.regions.resolve(utterance) {
            None => Ok(TransitionResult::new(state.clone(), reply::STATE_REPROMPT)),
            Some(RegionMatch::Ambiguous { region, hints }) => {
                let text = reply::disambiguation_prompt(&region, &hints);
                Ok(TransitionResult::new(
                    keep(Stage::AwaitingRegionDisambiguation {
                        category: category.clone(),
                        material: material.clone(),
                        region: Some(region),
                    }),
                    text,
                ))
            }
            Some(RegionMatch::Resolved(region)) => {
                query_suppliers(ctx.store, greeting_sent, category.as_ref(), material, &region)
            }
        },

        Stage::AwaitingRegionDisambiguation {
            category,
            material,
            region,
        } => match RegionTable::resolve_subregion(region.as_deref(), utterance) {
            Some(subregion) => {
                query_suppliers(ctx.store, greeting_sent, category.as_ref(), material, &subregion)
            }
            None => Ok(TransitionResult::new(
                state.clone(),
                reply::disambiguation_reprompt(&RegionTable::subregion_hints(region.as_deref())),
            )),
        },
    }
}

/// Lower-cased categories; names differing only in case collapse into one entry
fn list_categories<S: CatalogStore + ?Sized>(store: &S) -> Result<Vec<String>, CatalogError> {
    let mut seen = HashSet::new();
    Ok(store
        .list_categories()?
        .into_iter()
        .map(|c| c.to_lowercase())
        .filter(|c| seen.insert(c.clone()))
        .collect())
}

fn list_materials<S: CatalogStore + ?Sized>(
    store: &S,
    category: &str,
) -> Result<Vec<String>, CatalogError> {
    Ok(store
        .list_materials(category)?
        .into_iter()
        .map(|m| m.to_lowercase())
        .collect())
}

fn query_suppliers<S: CatalogStore + ?Sized>(
    store: &S,
    greeting_sent: bool,
    category: Option<&String>,
    material: &str,
    region: &str,
) -> Result<TransitionResult, TransitionError> {
    let mut quotes = store.query_suppliers(material, region)?;
    quotes.truncate(MAX_QUOTES);

    if quotes.is_empty() {
        return Ok(TransitionResult::new(
            ConversationState::new(
                Stage::AwaitingState {
                    category: category.cloned(),
                    material: material.to_string(),
                },
                greeting_sent,
            ),
            reply::no_quotes(region),
        ));
    }

    Ok(TransitionResult::new(
        ConversationState::new(
            Stage::QueryFinished {
                category: category.cloned(),
                material: Some(material.to_string()),
                region: Some(region.to_string()),
            },
            greeting_sent,
        ),
        reply::quotes(&quotes),
    ))
}
