//! Named weight tensors persisted as a JSON object of nested arrays.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::error::WeightsError;
use crate::network::{layout_of, Network, Weights};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightStore {
    networks: BTreeMap<String, Weights>,
}

impl WeightStore {
    pub fn new() -> Self {
        WeightStore::default()
    }

    pub fn load(path: &Path) -> Result<Self, WeightsError> {
        let content = fs::read_to_string(path).map_err(|e| WeightsError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let store: WeightStore =
            serde_json::from_str(&content).map_err(|e| WeightsError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;
        debug!(
            "loaded {} network(s) from {}",
            store.networks.len(),
            path.display()
        );
        Ok(store)
    }

    /// Write the store to `path`, replacing it only once the whole file has been written.
    pub fn save(&self, path: &Path) -> Result<(), WeightsError> {
        let json = serde_json::to_string(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| WeightsError::Write {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, path).map_err(|e| WeightsError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(
            "saved {} network(s) to {}",
            self.networks.len(),
            path.display()
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Weights, WeightsError> {
        self.networks
            .get(name)
            .ok_or_else(|| WeightsError::MissingNetwork(name.to_string()))
    }

    /// Replaces any tensor already stored under `name`.
    pub fn insert(&mut self, name: &str, weights: Weights) {
        self.networks.insert(name.to_string(), weights);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.networks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    /// Build a network from the tensor stored under `name`, which must have exactly `layout`.
    pub fn network<A: Activation>(
        &self,
        name: &str,
        layout: &[usize],
        learning_rate: f64,
        activation: A,
    ) -> Result<Network<A>, WeightsError> {
        let weights = self.get(name)?;
        let found = layout_of(weights);
        if found.as_deref() != Some(layout) {
            return Err(WeightsError::LayoutMismatch {
                name: name.to_string(),
                expected: layout.to_vec(),
                found,
            });
        }
        Ok(Network::from_weights(
            weights.clone(),
            learning_rate,
            activation,
        ))
    }
}
