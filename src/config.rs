use std::time::Duration;

use crate::item::ItemType;

/// Whether the output schema has a first-class dataset type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatasetSupport {
    #[default]
    Native,
    /// Datasets become generic documents and carry a `Type: dataset` line in `extra`.
    Fallback,
}

/// Settings resolved once at startup and passed to every translator call.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the repository site, used as archive and library catalog.
    pub site_name: String,
    pub dataset_support: DatasetSupport,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            site_name: "Zenodo".to_string(),
            dataset_support: DatasetSupport::default(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

impl Config {
    /// Item type that dataset records map to under this configuration.
    pub fn dataset_type(&self) -> ItemType {
        match self.dataset_support {
            DatasetSupport::Native => ItemType::Dataset,
            DatasetSupport::Fallback => ItemType::Document,
        }
    }
}
