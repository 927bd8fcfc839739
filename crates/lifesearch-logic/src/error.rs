//! Error and warning taxonomy.
//!
//! Hard failures ([`ResolveError`], [`WeightRangeError`]) abort one
//! operation. Everything else is a [`Warning`]: analysis carries on with a
//! reduced result and the warning is attached to the report.

use thiserror::Error;

use crate::params::ParamKey;

/// Parameter resolution failed outright.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// No source knows the planet and the override gives neither radius nor mass.
    #[error("planet not found: {name}")]
    PlanetNotFound { name: String },
    /// The planet name is empty after normalization.
    #[error("planet name {raw:?} is empty after normalization")]
    EmptyName { raw: String },
}

/// Problems found while parsing user override text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverrideError {
    #[error("cannot parse override segment {segment:?}: {reason}")]
    Parse {
        /// Normalized planet the segment belongs to, when one was named.
        planet: Option<String>,
        segment: String,
        reason: String,
    },
    #[error("override key {key:?} for {planet} is not a known parameter")]
    UnknownKey { planet: String, key: String },
    #[error("override {key}={value:?} for {planet} is not a number")]
    Type {
        planet: String,
        key: ParamKey,
        value: String,
    },
}

/// A weight update was rejected. Nothing was applied.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("weight {key} = {value} outside allowed range [{min}, {max}]")]
pub struct WeightRangeError {
    pub key: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

/// A quantity could not be computed because an input was missing.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{quantity} undetermined: missing {missing}")]
pub struct MissingInputError {
    pub quantity: &'static str,
    pub missing: String,
}

impl MissingInputError {
    pub fn new(quantity: &'static str, missing: impl Into<String>) -> Self {
        Self {
            quantity,
            missing: missing.into(),
        }
    }
}

/// Non-fatal issues attached to a planet analysis.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Warning {
    #[error("no source provides {0}")]
    MissingField(ParamKey),
    #[error(transparent)]
    Override(#[from] OverrideError),
    #[error("{index} factor {factor} excluded: {reason}")]
    FactorExcluded {
        index: &'static str,
        factor: &'static str,
        reason: String,
    },
    #[error(transparent)]
    Undetermined(#[from] MissingInputError),
    #[error("{index} factor {factor}: value and reference sum to zero")]
    DivisionSingularity {
        index: &'static str,
        factor: &'static str,
    },
    #[error("{source_name} unavailable; continuing with remaining sources")]
    SourceUnavailable { source_name: &'static str },
}

impl Warning {
    pub fn excluded(index: &'static str, factor: &'static str, reason: impl Into<String>) -> Self {
        Self::FactorExcluded {
            index,
            factor,
            reason: reason.into(),
        }
    }
}
