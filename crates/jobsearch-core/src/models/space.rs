use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::defaults;

/// One of the three precomputed embedding spaces of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingSpace {
    /// What the posting literally asks for.
    Explicit,
    /// What the posting implies (role, domain, level).
    Inferred,
    /// The hiring company.
    Company,
}

impl EmbeddingSpace {
    /// All spaces in matrix order.
    pub const ALL: [EmbeddingSpace; 3] = [Self::Explicit, Self::Inferred, Self::Company];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::Inferred => "inferred",
            Self::Company => "company",
        }
    }

    /// File name of this space's matrix inside a build directory.
    pub fn matrix_file(&self) -> &'static str {
        match self {
            Self::Explicit => "explicit.f32",
            Self::Inferred => "inferred.f32",
            Self::Company => "company.f32",
        }
    }
}

impl fmt::Display for EmbeddingSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-space weights of the combined similarity score.
///
/// Weights are used exactly as given (never renormalized). Negative values
/// clamp to zero; NaN and infinities are left for query validation to reject.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceWeights {
    pub explicit: f32,
    pub inferred: f32,
    pub company: f32,
}

impl SpaceWeights {
    pub fn new(explicit: f32, inferred: f32, company: f32) -> Self {
        Self {
            explicit,
            inferred,
            company,
        }
        .clamped()
    }

    /// Copy with negative weights raised to zero.
    pub fn clamped(self) -> Self {
        fn clamp(w: f32) -> f32 {
            if w < 0.0 {
                0.0
            } else {
                w
            }
        }
        Self {
            explicit: clamp(self.explicit),
            inferred: clamp(self.inferred),
            company: clamp(self.company),
        }
    }

    pub fn get(&self, space: EmbeddingSpace) -> f32 {
        match space {
            EmbeddingSpace::Explicit => self.explicit,
            EmbeddingSpace::Inferred => self.inferred,
            EmbeddingSpace::Company => self.company,
        }
    }

    /// `(space, weight)` pairs in matrix order.
    pub fn iter(&self) -> impl Iterator<Item = (EmbeddingSpace, f32)> + '_ {
        EmbeddingSpace::ALL.into_iter().map(|s| (s, self.get(s)))
    }
}

impl Default for SpaceWeights {
    fn default() -> Self {
        Self {
            explicit: defaults::DEFAULT_WEIGHT_EXPLICIT,
            inferred: defaults::DEFAULT_WEIGHT_INFERRED,
            company: defaults::DEFAULT_WEIGHT_COMPANY,
        }
    }
}
