//! Engine configuration.
//!
//! Every section has a `Default` reproducing the shipped constants, and
//! `#[serde(default)]` lets a partial JSON document override only what it
//! names:
//!
//! ```json
//! { "emission": { "usersBaseline": 25000 }, "offline": { "capHours": 8 } }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::systems::emission_governor::{EmissionConfig, GovernorTuning};
use crate::systems::offline_simulation::OfflinePolicy;
use crate::systems::stage_table::StageTable;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub stage_table: StageTable,
    pub emission: EmissionConfig,
    pub tuning: GovernorTuning,
    pub offline: OfflinePolicy,
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&raw)
    }

    /// The stage table validates itself on construction; this covers the rest.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.emission.validate()?;
        let t = &self.tuning;
        if t.window_ms <= 0 {
            return Err(ConfigError::Emission("windowMs"));
        }
        for (name, v) in [
            ("stepUp", t.step_up),
            ("stepDown", t.step_down),
            ("minDifficulty", t.min_difficulty),
            ("maxDifficulty", t.max_difficulty),
            ("initialDifficulty", t.initial_difficulty),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(ConfigError::Emission(name));
            }
        }
        if t.min_difficulty > t.max_difficulty {
            return Err(ConfigError::Emission("minDifficulty"));
        }
        if !(t.band.is_finite() && t.band >= 0.0) {
            return Err(ConfigError::Emission("band"));
        }
        let o = &self.offline;
        if !(o.cap_hours.is_finite() && o.cap_hours >= 0.0) {
            return Err(ConfigError::Emission("capHours"));
        }
        if !(o.efficiency.is_finite() && o.efficiency >= 0.0) {
            return Err(ConfigError::Emission("efficiency"));
        }
        Ok(())
    }
}
