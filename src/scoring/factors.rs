use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RegistryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorCategory {
    Behavioral,
    Financial,
    Engagement,
    Support,
}

impl FactorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FactorCategory::Behavioral => "behavioral",
            FactorCategory::Financial => "financial",
            FactorCategory::Engagement => "engagement",
            FactorCategory::Support => "support",
        }
    }
}

/// A named, weighted risk signal.
///
/// `weight` and `enabled` are independent: a disabled factor keeps its weight
/// so re-enabling it restores the previous contribution.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Factor {
    pub id: String,
    pub name: String,
    pub weight: f64,
    pub enabled: bool,
    pub category: FactorCategory,
}

impl Factor {
    pub fn new(id: &str, name: &str, weight: f64, category: FactorCategory) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            weight,
            enabled: true,
            category,
        }
    }
}

pub fn is_valid_weight(weight: f64) -> bool {
    (0.0..=1.0).contains(&weight)
}

/// Set of factors keyed by id.
///
/// Backed by an ordered map so every traversal (and therefore every float
/// summation over it) runs in id order, whatever order factors were added in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactorRegistry {
    factors: BTreeMap<String, Factor>,
}

impl FactorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a factor list, rejecting duplicates and bad weights.
    pub fn from_factors<I>(factors: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = Factor>,
    {
        let mut registry = Self::new();
        for factor in factors {
            registry.add_factor(factor)?;
        }
        Ok(registry)
    }

    /// Build from factors already checked by validation.
    pub(crate) fn from_validated<I>(factors: I) -> Self
    where
        I: IntoIterator<Item = Factor>,
    {
        Self {
            factors: factors.into_iter().map(|f| (f.id.clone(), f)).collect(),
        }
    }

    pub fn add_factor(&mut self, factor: Factor) -> Result<(), RegistryError> {
        if self.factors.contains_key(&factor.id) {
            return Err(RegistryError::DuplicateFactorId(factor.id));
        }
        if !is_valid_weight(factor.weight) {
            return Err(RegistryError::InvalidWeight {
                id: factor.id,
                weight: factor.weight,
            });
        }
        self.factors.insert(factor.id.clone(), factor);
        Ok(())
    }

    pub fn set_weight(&mut self, id: &str, weight: f64) -> Result<(), RegistryError> {
        let factor = self
            .factors
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownFactor(id.to_string()))?;
        if !is_valid_weight(weight) {
            return Err(RegistryError::InvalidWeight {
                id: id.to_string(),
                weight,
            });
        }
        factor.weight = weight;
        Ok(())
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<(), RegistryError> {
        let factor = self
            .factors
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownFactor(id.to_string()))?;
        factor.enabled = enabled;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Factor> {
        self.factors.get(id)
    }

    /// Enabled factors, in id order.
    pub fn active_factors(&self) -> Vec<&Factor> {
        self.factors.values().filter(|f| f.enabled).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Factor> {
        self.factors.values()
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}
