use crate::model::structures::feature_key::FeatureKey;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    ops::{Index, IndexMut}
};
use strum::{EnumCount, IntoEnumIterator};

/// A fixed-size mapping from every `FeatureKey` to a value.
///
/// Serialized as a map keyed by feature name; missing keys deserialize to zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<FeatureKey, f64>", into = "BTreeMap<FeatureKey, f64>")]
pub struct FeatureVector {
    values: [f64; FeatureKey::COUNT]
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::zeros()
    }
}

impl FeatureVector {
    pub fn zeros() -> FeatureVector {
        FeatureVector {
            values: [0.0; FeatureKey::COUNT]
        }
    }

    /// Every feature at its neutral baseline.
    pub fn neutral() -> FeatureVector {
        Self::from_fn(FeatureKey::neutral)
    }

    pub fn from_fn(f: impl Fn(FeatureKey) -> f64) -> FeatureVector {
        let mut vector = Self::zeros();
        for key in FeatureKey::iter() {
            vector[key] = f(key);
        }

        vector
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureKey, f64)> + '_ {
        FeatureKey::iter().map(move |key| (key, self[key]))
    }

    /// Element-wise mean. Returns `None` for an empty input.
    pub fn mean<'a>(vectors: impl IntoIterator<Item = &'a FeatureVector>) -> Option<FeatureVector> {
        let (sum, count) = vectors
            .into_iter()
            .fold((Self::zeros(), 0usize), |(sum, count), v| (sum.add(v), count + 1));

        if count == 0 {
            return None;
        }

        Some(sum.scale(1.0 / count as f64))
    }

    pub fn add(&self, other: &FeatureVector) -> FeatureVector {
        Self::from_fn(|key| self[key] + other[key])
    }

    pub fn difference(&self, other: &FeatureVector) -> FeatureVector {
        Self::from_fn(|key| self[key] - other[key])
    }

    pub fn scale(&self, factor: f64) -> FeatureVector {
        Self::from_fn(|key| self[key] * factor)
    }

    pub fn dot(&self, other: &FeatureVector) -> f64 {
        FeatureKey::iter().map(|key| self[key] * other[key]).sum()
    }

    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }
}

impl Index<FeatureKey> for FeatureVector {
    type Output = f64;

    fn index(&self, key: FeatureKey) -> &f64 {
        &self.values[key.index()]
    }
}

impl IndexMut<FeatureKey> for FeatureVector {
    fn index_mut(&mut self, key: FeatureKey) -> &mut f64 {
        &mut self.values[key.index()]
    }
}

impl From<BTreeMap<FeatureKey, f64>> for FeatureVector {
    fn from(map: BTreeMap<FeatureKey, f64>) -> Self {
        Self::from_fn(|key| map.get(&key).copied().unwrap_or(0.0))
    }
}

impl From<FeatureVector> for BTreeMap<FeatureKey, f64> {
    fn from(vector: FeatureVector) -> Self {
        vector.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::structures::{feature_key::FeatureKey, feature_vector::FeatureVector};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mean_of_empty_is_none() {
        let empty: Vec<FeatureVector> = Vec::new();
        assert_eq!(FeatureVector::mean(&empty), None);
    }

    #[test]
    fn test_mean() {
        let mut a = FeatureVector::zeros();
        a[FeatureKey::HeroKd] = 2.0;
        let mut b = FeatureVector::zeros();
        b[FeatureKey::HeroKd] = 4.0;
        b[FeatureKey::Rating] = 1.0;

        let mean = FeatureVector::mean(&[a, b]).unwrap();

        assert_abs_diff_eq!(mean[FeatureKey::HeroKd], 3.0);
        assert_abs_diff_eq!(mean[FeatureKey::Rating], 0.5);
        assert_abs_diff_eq!(mean[FeatureKey::UnitUptime], 0.0);
    }

    #[test]
    fn test_difference_and_dot() {
        let neutral = FeatureVector::neutral();
        let mut raised = neutral;
        raised[FeatureKey::HeroKd] += 1.5;

        let diff = raised.difference(&neutral);
        let mut weights = FeatureVector::zeros();
        weights[FeatureKey::HeroKd] = 2.0;

        assert_abs_diff_eq!(diff.dot(&weights), 3.0);
    }

    #[test]
    fn test_deserialize_missing_keys_as_zero() {
        let vector: FeatureVector = serde_json::from_str(r#"{"hero_kd": 1.25}"#).unwrap();

        assert_abs_diff_eq!(vector[FeatureKey::HeroKd], 1.25);
        assert_abs_diff_eq!(vector[FeatureKey::Rating], 0.0);
    }
}
