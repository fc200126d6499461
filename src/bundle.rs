//! Ephemeral named-argument bundles
//!
//! A constructed bundle is expanded once into an acquisition-function
//! factory and never reused. Values form a closed set of tagged variants;
//! the model handle travels alongside the bundle rather than inside it.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2};

use crate::constraints::OutcomeConstraints;
use crate::cost::{FidelityTransform, InverseCostWeightedUtility};
use crate::objective::Objective;
use crate::partitioning::Partitioning;
use crate::sampling::Sampler;

/// A single named argument value.
#[derive(Debug, Clone)]
pub enum ArgValue {
    /// Explicitly absent (mirrors an optional argument left unset).
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Tensor1(Array1<f64>),
    Tensor2(Array2<f64>),
    Fidelities(BTreeMap<usize, f64>),
    Objective(Objective),
    Sampler(Sampler),
    Partitioning(Partitioning),
    CostUtility(InverseCostWeightedUtility),
    Constraints(OutcomeConstraints),
    Transform(FidelityTransform),
}

impl ArgValue {
    pub fn is_none(&self) -> bool {
        matches!(self, ArgValue::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ArgValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_tensor1(&self) -> Option<&Array1<f64>> {
        match self {
            ArgValue::Tensor1(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_tensor2(&self) -> Option<&Array2<f64>> {
        match self {
            ArgValue::Tensor2(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_fidelities(&self) -> Option<&BTreeMap<usize, f64>> {
        match self {
            ArgValue::Fidelities(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_objective(&self) -> Option<&Objective> {
        match self {
            ArgValue::Objective(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_sampler(&self) -> Option<&Sampler> {
        match self {
            ArgValue::Sampler(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_partitioning(&self) -> Option<&Partitioning> {
        match self {
            ArgValue::Partitioning(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_cost_utility(&self) -> Option<&InverseCostWeightedUtility> {
        match self {
            ArgValue::CostUtility(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_constraints(&self) -> Option<&OutcomeConstraints> {
        match self {
            ArgValue::Constraints(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_transform(&self) -> Option<&FidelityTransform> {
        match self {
            ArgValue::Transform(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Option<Objective>> for ArgValue {
    fn from(value: Option<Objective>) -> Self {
        value.map_or(ArgValue::None, ArgValue::Objective)
    }
}

impl From<Option<Sampler>> for ArgValue {
    fn from(value: Option<Sampler>) -> Self {
        value.map_or(ArgValue::None, ArgValue::Sampler)
    }
}

impl From<Option<Array2<f64>>> for ArgValue {
    fn from(value: Option<Array2<f64>>) -> Self {
        value.map_or(ArgValue::None, ArgValue::Tensor2)
    }
}

/// Named-argument bundle keyed by the acquisition constructor's parameter
/// names. Later inserts win, matching keyword-argument merge semantics.
#[derive(Debug, Clone, Default)]
pub struct InputBundle {
    values: BTreeMap<&'static str, ArgValue>,
}

impl InputBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a named argument.
    pub fn insert(&mut self, name: &'static str, value: impl Into<ArgValue>) {
        self.values.insert(name, value.into());
    }

    /// Builder-style insert.
    pub fn set(mut self, name: &'static str, value: impl Into<ArgValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Merge another bundle into this one; the other bundle's entries win.
    pub fn merge(&mut self, other: InputBundle) {
        self.values.extend(other.values);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ArgValue)> {
        self.values.iter().map(|(&k, v)| (k, v))
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        ArgValue::Float(value)
    }
}

impl From<Array1<f64>> for ArgValue {
    fn from(value: Array1<f64>) -> Self {
        ArgValue::Tensor1(value)
    }
}

impl From<Array2<f64>> for ArgValue {
    fn from(value: Array2<f64>) -> Self {
        ArgValue::Tensor2(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_insert_and_get() {
        let mut bundle = InputBundle::new();
        bundle.insert("best_f", 3.0);
        bundle.insert("maximize", true);
        bundle.insert("num_fantasies", 20i64);

        assert_eq!(bundle.len(), 3);
        assert_eq!(bundle.get("best_f").and_then(ArgValue::as_float), Some(3.0));
        assert_eq!(
            bundle.get("maximize").and_then(ArgValue::as_bool),
            Some(true)
        );
        assert_eq!(
            bundle.get("num_fantasies").and_then(ArgValue::as_int),
            Some(20)
        );
        assert!(bundle.get("missing").is_none());
    }

    #[test]
    fn test_merge_later_wins() {
        let base = InputBundle::new().set("beta", 0.2).set("maximize", true);
        let mut merged = base;
        merged.merge(InputBundle::new().set("beta", 1.0));
        assert_eq!(merged.get("beta").and_then(ArgValue::as_float), Some(1.0));
        assert_eq!(
            merged.get("maximize").and_then(ArgValue::as_bool),
            Some(true)
        );
    }

    #[test]
    fn test_explicit_none_entries() {
        let bundle = InputBundle::new().set("sampler", ArgValue::None);
        assert!(bundle.contains("sampler"));
        assert!(bundle.get("sampler").is_some_and(ArgValue::is_none));
    }

    #[test]
    fn test_accessor_type_mismatch() {
        let bundle = InputBundle::new().set("ref_point", arr1(&[1.0, 2.0]));
        assert!(bundle.get("ref_point").and_then(ArgValue::as_float).is_none());
        assert_eq!(
            bundle.get("ref_point").and_then(ArgValue::as_tensor1),
            Some(&arr1(&[1.0, 2.0]))
        );
    }
}
