//! Packing jobs as they arrive from outside: a JSON file for the CLI or a
//! request body for the server. Numbers are read signed so that negative
//! dimensions are reported instead of silently failing to parse.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::PackOptions;
use crate::error::Result;
use crate::ordering::OrderingPolicy;
use crate::types::{Dims, Item};

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct DimsInput {
    pub length: i64,
    pub width: i64,
    pub height: i64,
}

impl DimsInput {
    pub fn validate(&self) -> Result<Dims> {
        Dims::try_new(self.length, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ItemInput {
    pub length: i64,
    pub width: i64,
    pub height: i64,
    #[serde(default = "default_qty")]
    pub qty: i64,
}

fn default_qty() -> i64 {
    1
}

impl ItemInput {
    pub fn validate(&self) -> Result<Item> {
        Item::try_new(self.length, self.width, self.height, self.qty)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Job {
    pub container: DimsInput,
    #[serde(default)]
    pub items: Vec<ItemInput>,
    #[serde(default)]
    pub budget_ms: Option<u64>,
    #[serde(default)]
    pub order: Option<String>,
}

impl Job {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn container(&self) -> Result<Dims> {
        self.container.validate()
    }

    pub fn items(&self) -> Result<Vec<Item>> {
        self.items.iter().map(ItemInput::validate).collect()
    }

    /// Options for this job; fields the job leaves out come from `base`.
    pub fn options(&self, base: PackOptions) -> Result<PackOptions> {
        let mut options = base;
        if let Some(ms) = self.budget_ms {
            options.warning_budget = Duration::from_millis(ms);
        }
        if let Some(order) = &self.order {
            options.ordering = order.parse::<OrderingPolicy>()?;
        }
        Ok(options)
    }
}
