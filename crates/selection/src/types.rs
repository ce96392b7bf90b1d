//! Selection types: raw user choices and the resolved FilterSpec.

use anyhow::{Context, Result};
use fee_data::Tier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Whether a tier drops tagged rows when nothing is selected for it.
///
/// Tier A defaults to lenient (an empty selection means "no constraint");
/// tiers B and C default to strict (an empty selection drops every row that
/// carries a tag of that tier).
pub fn default_strict_when_empty(tier: Tier) -> bool {
    match tier {
        Tier::A => false,
        Tier::B | Tier::C => true,
    }
}

/// Allowed tokens for one grade tier plus its empty-selection policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSelection {
    pub allowed: BTreeSet<String>,
    pub strict_when_empty: bool,
}

impl TierSelection {
    pub fn new<I, S>(allowed: I, strict_when_empty: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
            strict_when_empty,
        }
    }

    /// An empty selection with the tier's default policy
    pub fn empty(tier: Tier) -> Self {
        Self::new(Vec::<String>::new(), default_strict_when_empty(tier))
    }

    pub fn permits(&self, token: &str) -> bool {
        self.allowed.contains(token)
    }
}

/// The resolved, immutable criteria for one evaluation pass.
///
/// Built once per selection change (see `build_filter_spec`) and only ever
/// read by the filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub tier_a: TierSelection,
    pub tier_b: TierSelection,
    pub tier_c: TierSelection,
    pub excluded_tags: BTreeSet<String>,
    pub allowed_departments: BTreeSet<String>,
    pub exclude_cancer: bool,
    pub exclude_transplant: bool,
    pub excluded_testrooms: BTreeSet<String>,
}

impl Default for FilterSpec {
    /// Nothing selected anywhere, default empty-selection policies
    fn default() -> Self {
        Self {
            tier_a: TierSelection::empty(Tier::A),
            tier_b: TierSelection::empty(Tier::B),
            tier_c: TierSelection::empty(Tier::C),
            excluded_tags: BTreeSet::new(),
            allowed_departments: BTreeSet::new(),
            exclude_cancer: false,
            exclude_transplant: false,
            excluded_testrooms: BTreeSet::new(),
        }
    }
}

impl FilterSpec {
    pub fn tier(&self, tier: Tier) -> &TierSelection {
        match tier {
            Tier::A => &self.tier_a,
            Tier::B => &self.tier_b,
            Tier::C => &self.tier_c,
        }
    }

    fn tier_mut(&mut self, tier: Tier) -> &mut TierSelection {
        match tier {
            Tier::A => &mut self.tier_a,
            Tier::B => &mut self.tier_b,
            Tier::C => &mut self.tier_c,
        }
    }

    // Builder methods, mostly for tests and programmatic callers

    pub fn with_allowed(mut self, tier: Tier, tokens: &[&str]) -> Self {
        self.tier_mut(tier).allowed = to_set(tokens);
        self
    }

    pub fn with_strict_when_empty(mut self, tier: Tier, strict: bool) -> Self {
        self.tier_mut(tier).strict_when_empty = strict;
        self
    }

    pub fn with_excluded_tags(mut self, tags: &[&str]) -> Self {
        self.excluded_tags = to_set(tags);
        self
    }

    pub fn with_departments(mut self, departments: &[&str]) -> Self {
        self.allowed_departments = to_set(departments);
        self
    }

    pub fn with_excluded_testrooms(mut self, testrooms: &[&str]) -> Self {
        self.excluded_testrooms = to_set(testrooms);
        self
    }

    pub fn excluding_cancer(mut self, exclude: bool) -> Self {
        self.exclude_cancer = exclude;
        self
    }

    pub fn excluding_transplant(mut self, exclude: bool) -> Self {
        self.exclude_transplant = exclude;
        self
    }
}

fn to_set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Raw user choices, as they come from a selection file or CLI flags.
///
/// `None` means "the user did not touch this control" and resolves to the
/// control's default; `Some(vec![])` means "explicitly nothing selected".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Selections {
    pub tier_a: Option<Vec<String>>,
    pub tier_b: Option<Vec<String>>,
    pub tier_c: Option<Vec<String>>,
    pub strict_a: Option<bool>,
    pub strict_b: Option<bool>,
    pub strict_c: Option<bool>,
    pub exclude_tags: Option<Vec<String>>,
    pub departments: Option<Vec<String>>,
    pub exclude_cancer: Option<bool>,
    pub exclude_transplant: Option<bool>,
    pub exclude_testrooms: Option<Vec<String>>,
}

impl Selections {
    /// Read selections from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read selections from {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid selections file {}", path.display()))
    }

    pub fn tier(&self, tier: Tier) -> Option<&[String]> {
        match tier {
            Tier::A => self.tier_a.as_deref(),
            Tier::B => self.tier_b.as_deref(),
            Tier::C => self.tier_c.as_deref(),
        }
    }

    pub fn strict(&self, tier: Tier) -> Option<bool> {
        match tier {
            Tier::A => self.strict_a,
            Tier::B => self.strict_b,
            Tier::C => self.strict_c,
        }
    }
}
