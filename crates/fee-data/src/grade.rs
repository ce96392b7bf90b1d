//! Facility grade tiers and their reference vocabularies.
//!
//! Grade tokens fall into three disjoint tiers:
//! - Tier A: facility type (의원, 병원, 종합병원, ...)
//! - Tier B: emergency-care designation (권역응급의료센터, ...)
//! - Tier C: regional designation (분만취약지, 의료취약지역, ...)
//!
//! Anything else is unclassified and never affects filtering.

use crate::error::{DataLoadError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Tier A tokens of the fee schedule
pub const TIER_A_TOKENS: [&str; 12] = [
    "한의원",
    "보건의료원",
    "의원",
    "병원",
    "정신병원",
    "종합병원",
    "치과병원",
    "치과의원",
    "한방병원",
    "상급종합병원",
    "요양병원",
    "공통",
];

/// Tier B tokens of the fee schedule
pub const TIER_B_TOKENS: [&str; 7] = [
    "소아전문응급의료센터",
    "권역외상센터",
    "권역응급의료센터",
    "전문응급의료센터",
    "중앙응급의료센터",
    "지역응급의료기관",
    "지역응급의료센터",
];

/// Tier C tokens of the fee schedule
pub const TIER_C_TOKENS: [&str; 4] = [
    "분만취약지",
    "서울특별시 및 광역시 구지역 소재 요양기관",
    "서울특별시 및 광역시 구지역 소재 요양기관이 아닌 경우",
    "의료취약지역",
];

/// The three grade tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    A,
    B,
    C,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::A, Tier::B, Tier::C];

    pub fn label(self) -> &'static str {
        match self {
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed reference vocabularies for the three tiers.
///
/// Built once and shared (behind an `Arc`) by every grade filter. The
/// constructor rejects a token that appears in more than one tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeVocabulary {
    tiers: [Vec<String>; 3],
    index: HashMap<String, Tier>,
}

impl GradeVocabulary {
    /// Build a vocabulary from explicit token lists.
    ///
    /// Tokens are trimmed; blank tokens and in-tier repeats are ignored.
    pub fn new<S: AsRef<str>>(a: &[S], b: &[S], c: &[S]) -> Result<Self> {
        let mut tiers: [Vec<String>; 3] = Default::default();
        let mut index: HashMap<String, Tier> = HashMap::new();

        for (tier, tokens) in Tier::ALL.into_iter().zip([a, b, c]) {
            for token in tokens {
                let token = token.as_ref().trim();
                if token.is_empty() {
                    continue;
                }
                match index.get(token) {
                    Some(&existing) if existing == tier => continue,
                    Some(&existing) => {
                        return Err(DataLoadError::OverlappingVocabulary {
                            token: token.to_string(),
                            first: existing.to_string(),
                            second: tier.to_string(),
                        });
                    }
                    None => {
                        index.insert(token.to_string(), tier);
                        tiers[tier as usize].push(token.to_string());
                    }
                }
            }
        }

        Ok(Self { tiers, index })
    }

    /// Which tier a token belongs to, or `None` if unclassified
    pub fn tier_of(&self, token: &str) -> Option<Tier> {
        self.index.get(token).copied()
    }

    pub fn contains(&self, tier: Tier, token: &str) -> bool {
        self.tier_of(token) == Some(tier)
    }

    /// Tokens of one tier in declaration order
    pub fn tokens(&self, tier: Tier) -> &[String] {
        &self.tiers[tier as usize]
    }

    /// The subset of `tags` belonging to `tier`, in tag order
    pub fn tags_in<'a>(&'a self, tags: &'a [String], tier: Tier) -> impl Iterator<Item = &'a str> {
        tags.iter()
            .map(String::as_str)
            .filter(move |tag| self.contains(tier, tag))
    }
}

impl Default for GradeVocabulary {
    fn default() -> Self {
        let mut tiers: [Vec<String>; 3] = Default::default();
        let mut index = HashMap::new();
        for (tier, tokens) in Tier::ALL
            .into_iter()
            .zip([&TIER_A_TOKENS[..], &TIER_B_TOKENS[..], &TIER_C_TOKENS[..]])
        {
            for token in tokens {
                index.insert(token.to_string(), tier);
                tiers[tier as usize].push(token.to_string());
            }
        }
        Self { tiers, index }
    }
}
