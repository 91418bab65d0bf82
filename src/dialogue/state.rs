//! Conversation state types
//!
//! [`StateSnapshot`] is the flat record persisted between turns.
//! [`ConversationState`] is the typed form the transition function works on:
//! each [`Stage`] variant carries only the fields that stage uses, so a menu
//! left over from an earlier stage cannot be consulted by mistake.

use super::reply::ENDED_FALLBACK;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Wire Form
// ============================================================================

/// Stage names as they appear in the persisted snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    #[default]
    AwaitingCategory,
    AwaitingCategoryChoice,
    AwaitingMaterialChoice,
    AwaitingState,
    AwaitingRegionDisambiguation,
    QueryFinished,
    Ended,
}

impl StageName {
    pub fn as_str(self) -> &'static str {
        match self {
            StageName::AwaitingCategory => "awaiting_category",
            StageName::AwaitingCategoryChoice => "awaiting_category_choice",
            StageName::AwaitingMaterialChoice => "awaiting_material_choice",
            StageName::AwaitingState => "awaiting_state",
            StageName::AwaitingRegionDisambiguation => "awaiting_region_disambiguation",
            StageName::QueryFinished => "query_finished",
            StageName::Ended => "ended",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat conversation state, round-tripped through the session store every turn.
///
/// Only strings, booleans, string lists and nullable strings, so any session
/// mechanism can persist it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub stage: StageName,
    #[serde(default)]
    pub selected_category: Option<String>,
    #[serde(default)]
    pub selected_material: Option<String>,
    #[serde(default)]
    pub selected_state: Option<String>,
    #[serde(default)]
    pub available_categories: Vec<String>,
    #[serde(default)]
    pub available_materials: Vec<String>,
    #[serde(default)]
    pub initial_greeting_sent: bool,
    #[serde(default)]
    pub last_reply: Option<String>,
}

// ============================================================================
// Typed Form
// ============================================================================

/// Position in the guided conversation, with the data that position owns
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Stage {
    /// Nothing offered yet; the next turn lists categories
    #[default]
    AwaitingCategory,

    /// Categories offered, waiting for a pick
    AwaitingCategoryChoice { categories: Vec<String> },

    /// Materials of `category` offered, waiting for a pick
    AwaitingMaterialChoice {
        category: Option<String>,
        materials: Vec<String>,
    },

    /// Material chosen, waiting for a delivery region
    AwaitingState {
        category: Option<String>,
        material: String,
    },

    /// `region` matched a parent with several sub-regions in the catalog
    AwaitingRegionDisambiguation {
        category: Option<String>,
        material: String,
        region: Option<String>,
    },

    /// Quotes delivered, waiting for yes/no on another query
    QueryFinished {
        category: Option<String>,
        material: Option<String>,
        region: Option<String>,
    },

    /// Conversation closed; every further turn replays `last_reply`
    Ended { last_reply: String },
}

impl Stage {
    pub fn name(&self) -> StageName {
        match self {
            Stage::AwaitingCategory => StageName::AwaitingCategory,
            Stage::AwaitingCategoryChoice { .. } => StageName::AwaitingCategoryChoice,
            Stage::AwaitingMaterialChoice { .. } => StageName::AwaitingMaterialChoice,
            Stage::AwaitingState { .. } => StageName::AwaitingState,
            Stage::AwaitingRegionDisambiguation { .. } => StageName::AwaitingRegionDisambiguation,
            Stage::QueryFinished { .. } => StageName::QueryFinished,
            Stage::Ended { .. } => StageName::Ended,
        }
    }
}

/// Full conversation state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversationState {
    /// Suppresses the greeting on later visits to `AwaitingCategory`
    pub greeting_sent: bool,
    pub stage: Stage,
}

impl ConversationState {
    pub fn new(stage: Stage, greeting_sent: bool) -> Self {
        Self {
            greeting_sent,
            stage,
        }
    }

    pub fn stage_name(&self) -> StageName {
        self.stage.name()
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.stage, Stage::Ended { .. })
    }

    pub fn to_snapshot(&self) -> StateSnapshot {
        let mut snapshot = StateSnapshot {
            stage: self.stage_name(),
            initial_greeting_sent: self.greeting_sent,
            ..StateSnapshot::default()
        };

        match &self.stage {
            Stage::AwaitingCategory => {}
            Stage::AwaitingCategoryChoice { categories } => {
                snapshot.available_categories.clone_from(categories);
            }
            Stage::AwaitingMaterialChoice {
                category,
                materials,
            } => {
                snapshot.selected_category.clone_from(category);
                snapshot.available_materials.clone_from(materials);
            }
            Stage::AwaitingState { category, material } => {
                snapshot.selected_category.clone_from(category);
                snapshot.selected_material = Some(material.clone());
            }
            Stage::AwaitingRegionDisambiguation {
                category,
                material,
                region,
            } => {
                snapshot.selected_category.clone_from(category);
                snapshot.selected_material = Some(material.clone());
                snapshot.selected_state.clone_from(region);
            }
            Stage::QueryFinished {
                category,
                material,
                region,
            } => {
                snapshot.selected_category.clone_from(category);
                snapshot.selected_material.clone_from(material);
                snapshot.selected_state.clone_from(region);
            }
            Stage::Ended { last_reply } => {
                snapshot.last_reply = Some(last_reply.clone());
            }
        }

        snapshot
    }
}

/// A persisted stage is missing a selection it cannot work without
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("stage {stage} is missing {missing}")]
pub struct StateCorrupt {
    pub stage: StageName,
    pub missing: &'static str,
}

impl TryFrom<StateSnapshot> for ConversationState {
    type Error = StateCorrupt;

    fn try_from(snapshot: StateSnapshot) -> Result<Self, Self::Error> {
        let stage_name = snapshot.stage;
        let require = |value: Option<String>, missing: &'static str| {
            value.ok_or(StateCorrupt {
                stage: stage_name,
                missing,
            })
        };

        let stage = match stage_name {
            StageName::AwaitingCategory => Stage::AwaitingCategory,
            StageName::AwaitingCategoryChoice => Stage::AwaitingCategoryChoice {
                categories: snapshot.available_categories,
            },
            StageName::AwaitingMaterialChoice => Stage::AwaitingMaterialChoice {
                category: snapshot.selected_category,
                materials: snapshot.available_materials,
            },
            StageName::AwaitingState => Stage::AwaitingState {
                category: snapshot.selected_category,
                material: require(snapshot.selected_material, "selected_material")?,
            },
            StageName::AwaitingRegionDisambiguation => Stage::AwaitingRegionDisambiguation {
                category: snapshot.selected_category,
                material: require(snapshot.selected_material, "selected_material")?,
                region: snapshot.selected_state,
            },
            StageName::QueryFinished => Stage::QueryFinished {
                category: snapshot.selected_category,
                material: snapshot.selected_material,
                region: snapshot.selected_state,
            },
            StageName::Ended => Stage::Ended {
                last_reply: snapshot
                    .last_reply
                    .unwrap_or_else(|| ENDED_FALLBACK.to_string()),
            },
        };

        Ok(ConversationState::new(stage, snapshot.initial_greeting_sent))
    }
}
