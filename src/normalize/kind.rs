//! normalize::kind — select a scale by name.
use std::{fmt, str::FromStr};

use crate::{
    engine::Expr,
    normalize::{
        errors::{NormalizeError, NormalizeResult},
        scales::{LogPerc, Normalizer, Perc},
    },
};

/// Name of a normalization scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleKind {
    Perc,
    LogPerc,
}

impl ScaleKind {
    /// Build the named scale with a validated `eps`.
    ///
    /// Errors
    /// ------
    /// - `NormalizeError::InvalidEps`
    ///   `eps` is non-finite or `<= 0`.
    pub fn with_eps(self, eps: f64) -> NormalizeResult<Scale> {
        Ok(match self {
            ScaleKind::Perc => Scale::Perc(Perc::new(eps)?),
            ScaleKind::LogPerc => Scale::LogPerc(LogPerc::new(eps)?),
        })
    }
}

impl FromStr for ScaleKind {
    type Err = NormalizeError;

    /// Parse a scale name (case-insensitive).
    ///
    /// Accepts `"perc"` and `"log_perc"`; any other value returns
    /// `NormalizeError::UnknownScale`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "perc" => Ok(ScaleKind::Perc),
            "log_perc" => Ok(ScaleKind::LogPerc),
            _ => Err(NormalizeError::UnknownScale {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'perc' or 'log_perc'.",
            }),
        }
    }
}

impl fmt::Display for ScaleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleKind::Perc => write!(f, "perc"),
            ScaleKind::LogPerc => write!(f, "log_perc"),
        }
    }
}

/// A configured scale chosen at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    Perc(Perc),
    LogPerc(LogPerc),
}

impl Scale {
    pub fn kind(&self) -> ScaleKind {
        match self {
            Scale::Perc(_) => ScaleKind::Perc,
            Scale::LogPerc(_) => ScaleKind::LogPerc,
        }
    }
}

impl Normalizer for Scale {
    fn normalize<E: Expr>(&self, value: &E, wrt: &E) -> E {
        match self {
            Scale::Perc(p) => p.normalize(value, wrt),
            Scale::LogPerc(p) => p.normalize(value, wrt),
        }
    }

    fn denormalize<E: Expr>(&self, normalized: &E, wrt: &E) -> E {
        match self {
            Scale::Perc(p) => p.denormalize(normalized, wrt),
            Scale::LogPerc(p) => p.denormalize(normalized, wrt),
        }
    }
}
