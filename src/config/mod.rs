use serde::Deserialize;

use crate::matching::{MatchingEngine, SequenceIds};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub market: String,
    #[serde(default = "default_first_order_id")]
    pub first_order_id: u64,
    #[serde(default = "default_snapshot_depth")]
    pub snapshot_depth: usize,
    #[serde(default)]
    pub sequencer: SequencerConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SequencerConfig {
    pub queue_capacity: usize,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self { queue_capacity: 1024 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_first_order_id() -> u64 {
    1
}

fn default_snapshot_depth() -> usize {
    10
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Settings {
    /// Loads `path` (any format the `config` crate recognises by extension),
    /// then applies `LOB_`-prefixed environment overrides such as
    /// `LOB_SEQUENCER__QUEUE_CAPACITY=64`.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("LOB").separator("__"));
        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn for_market(market: impl Into<String>) -> Self {
        Self {
            market: market.into(),
            first_order_id: default_first_order_id(),
            snapshot_depth: default_snapshot_depth(),
            sequencer: SequencerConfig::default(),
            log: LogConfig::default(),
        }
    }

    pub fn engine(&self) -> MatchingEngine<SequenceIds> {
        MatchingEngine::with_ids(self.market.clone(), SequenceIds::starting_at(self.first_order_id))
    }
}
