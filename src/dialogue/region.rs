//! Region normalization
//!
//! Maps free-text region mentions (abbreviations, full names, sub-region
//! hints) to the canonical region names suppliers are registered under.

use super::utterance::Utterance;
use crate::catalog::CatalogResult;
use crate::runtime::CatalogStore;
use std::collections::HashSet;

/// A store-level variant of a region, picked by a hint word
#[derive(Debug)]
struct SubRegion {
    hint: &'static str,
    canonical: &'static str,
}

/// A region the catalog may split into several sub-regions
#[derive(Debug)]
struct SplitRegion {
    canonical: &'static str,
    subregions: &'static [SubRegion],
}

const SPLIT_REGIONS: &[SplitRegion] = &[SplitRegion {
    canonical: "minas gerais",
    subregions: &[
        SubRegion {
            hint: "betim",
            canonical: "minas gerais (betim)",
        },
        SubRegion {
            hint: "extrema",
            canonical: "minas gerais (extrema)",
        },
    ],
}];

/// Alias -> canonical region
const STATIC_ALIASES: &[(&str, &str)] = &[
    ("sp", "são paulo"),
    ("são paulo", "são paulo"),
    ("ba", "bahia"),
    ("bahia", "bahia"),
    ("rj", "rio de janeiro"),
    ("rio de janeiro", "rio de janeiro"),
    ("mg", "minas gerais"),
    ("minas gerais", "minas gerais"),
    ("minas gerais (extrema)", "minas gerais (extrema)"),
    ("extrema", "minas gerais (extrema)"),
    ("minas gerais (betim)", "minas gerais (betim)"),
    ("betim", "minas gerais (betim)"),
    ("rs", "rio grande do sul"),
    ("rio grande do sul", "rio grande do sul"),
    ("sc", "santa catarina"),
    ("santa catarina", "santa catarina"),
    ("df", "distrito federal"),
    ("distrito federal", "distrito federal"),
    ("pe", "pernambuco"),
    ("pernambuco", "pernambuco"),
    ("ce", "ceará"),
    ("ceara", "ceará"),
];

/// Outcome of reading a region from user text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionMatch {
    /// Canonical region ready to query
    Resolved(String),
    /// Parent region with several sub-regions in the catalog; ask which one
    Ambiguous {
        region: String,
        hints: Vec<&'static str>,
    },
}

/// Alias table for one turn, built from the static aliases plus every region
/// the catalog knows.
#[derive(Debug, Clone)]
pub struct RegionTable {
    /// Longest alias first; equal lengths keep insertion order
    aliases: Vec<(String, String)>,
    known: HashSet<String>,
}

impl RegionTable {
    pub fn new<I, R>(store_regions: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        let mut aliases: Vec<(String, String)> = STATIC_ALIASES
            .iter()
            .map(|(alias, canonical)| ((*alias).to_string(), (*canonical).to_string()))
            .collect();

        let mut known = HashSet::new();
        for region in store_regions {
            let region = region.as_ref().trim().to_lowercase();
            if region.is_empty() {
                continue;
            }
            if !aliases.iter().any(|(alias, _)| *alias == region) {
                aliases.push((region.clone(), region.clone()));
            }
            known.insert(region);
        }

        aliases.sort_by_key(|(alias, _)| std::cmp::Reverse(alias.chars().count()));

        Self { aliases, known }
    }

    pub fn from_store<S: CatalogStore + ?Sized>(store: &S) -> CatalogResult<Self> {
        Ok(Self::new(store.list_distinct_regions()?))
    }

    /// Canonical region named in the text. Sub-region hints win over any alias.
    pub fn lookup(&self, utterance: &Utterance) -> Option<String> {
        if let Some(sub) = match_hint(utterance, SPLIT_REGIONS.iter()) {
            return Some(sub.canonical.to_string());
        }

        self.aliases
            .iter()
            .find(|(alias, _)| utterance.contains(alias))
            .map(|(_, canonical)| canonical.clone())
    }

    /// Like [`lookup`](Self::lookup), but a split parent is narrowed by what the
    /// catalog holds: one sub-region present resolves to it, several ask.
    pub fn resolve(&self, utterance: &Utterance) -> Option<RegionMatch> {
        let region = self.lookup(utterance)?;
        let Some(split) = split_region(&region) else {
            return Some(RegionMatch::Resolved(region));
        };

        let present: Vec<&SubRegion> = split
            .subregions
            .iter()
            .filter(|sub| self.known.contains(sub.canonical))
            .collect();

        Some(match present.as_slice() {
            [] => RegionMatch::Resolved(region),
            [only] => RegionMatch::Resolved(only.canonical.to_string()),
            many => RegionMatch::Ambiguous {
                region,
                hints: many.iter().map(|sub| sub.hint).collect(),
            },
        })
    }

    /// Sub-region of `parent` picked by a hint in the text. Without a known
    /// split parent every split region's hints are tried.
    pub fn resolve_subregion(parent: Option<&str>, utterance: &Utterance) -> Option<String> {
        let sub = match parent.and_then(split_region) {
            Some(split) => match_hint(utterance, std::iter::once(split)),
            None => match_hint(utterance, SPLIT_REGIONS.iter()),
        };
        sub.map(|s| s.canonical.to_string())
    }

    /// Hint words offered when asking which sub-region of `parent` is meant
    pub fn subregion_hints(parent: Option<&str>) -> Vec<&'static str> {
        match parent.and_then(split_region) {
            Some(split) => split.subregions.iter().map(|s| s.hint).collect(),
            None => SPLIT_REGIONS
                .iter()
                .flat_map(|split| split.subregions.iter().map(|s| s.hint))
                .collect(),
        }
    }
}

fn split_region(region: &str) -> Option<&'static SplitRegion> {
    SPLIT_REGIONS.iter().find(|split| split.canonical == region)
}

fn match_hint<'a>(
    utterance: &Utterance,
    splits: impl Iterator<Item = &'a SplitRegion>,
) -> Option<&'a SubRegion> {
    splits
        .flat_map(|split| split.subregions.iter())
        .find(|sub| utterance.contains(sub.hint))
}
