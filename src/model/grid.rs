//! Hyperparameter search grids

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single hyperparameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Str(_) => None,
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        match self {
            ParamValue::Int(v) if *v >= 0 => Some(*v as usize),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Str(v) => write!(f, "{v}"),
        }
    }
}

/// One concrete parameter combination, name to value.
pub type ParamSet = BTreeMap<String, ParamValue>;

/// An enumerated hyperparameter search space for one model.
///
/// Entries keep their insertion order so the expansion order, and with it
/// the search's tie-break on equal CV scores, is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParamGrid {
    entries: Vec<(String, Vec<ParamValue>)>,
}

impl ParamGrid {
    /// An empty grid; expands to a single empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, values: Vec<ParamValue>) -> Self {
        self.entries.push((name.into(), values));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exhaustive cartesian product of all entries.
    pub fn expand(&self) -> Vec<ParamSet> {
        let mut sets: Vec<ParamSet> = vec![ParamSet::new()];

        for (name, values) in &self.entries {
            let mut next = Vec::with_capacity(sets.len() * values.len());
            for set in &sets {
                for value in values {
                    let mut expanded = set.clone();
                    expanded.insert(name.clone(), value.clone());
                    next.push(expanded);
                }
            }
            sets = next;
        }

        sets
    }
}

/// Shorthand constructors used by the registry.
pub fn ints(values: &[i64]) -> Vec<ParamValue> {
    values.iter().map(|&v| ParamValue::Int(v)).collect()
}

pub fn floats(values: &[f64]) -> Vec<ParamValue> {
    values.iter().map(|&v| ParamValue::Float(v)).collect()
}
