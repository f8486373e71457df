//! Stage/multiplier table: ordered `[start, end] → multiplier` bands.
//!
//! Pure data. Built through [`StageTable::new`] or deserialization, both of
//! which validate, so a live table always has a positive base value and at
//! least one band.
//!
//! Wire shape (kept compatible with existing saved configs):
//! `{ "v1": 0.5, "blocks": [{ "start": 1, "end": 10, "r": 1.6 }], "maxStage": 1000 }`

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_BASE_VALUE: f64 = 0.5;
pub const DEFAULT_MAX_STAGE: u32 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageBand {
    #[serde(rename = "start")]
    pub start_stage: u32,
    #[serde(rename = "end")]
    pub end_stage: u32,
    #[serde(rename = "r")]
    pub multiplier: f64,
}

impl StageBand {
    pub const fn new(start_stage: u32, end_stage: u32, multiplier: f64) -> Self {
        Self { start_stage, end_stage, multiplier }
    }

    #[inline]
    pub fn contains(&self, stage: u32) -> bool {
        stage >= self.start_stage && stage <= self.end_stage
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStageTable", into = "RawStageTable")]
pub struct StageTable {
    base_value: f64,
    bands: Vec<StageBand>,
    max_stage: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStageTable {
    v1: f64,
    blocks: Vec<StageBand>,
    #[serde(default = "default_max_stage")]
    max_stage: u32,
}

fn default_max_stage() -> u32 {
    DEFAULT_MAX_STAGE
}

impl TryFrom<RawStageTable> for StageTable {
    type Error = ConfigError;
    fn try_from(raw: RawStageTable) -> Result<Self, Self::Error> {
        StageTable::with_max_stage(raw.v1, raw.blocks, raw.max_stage)
    }
}

impl From<StageTable> for RawStageTable {
    fn from(t: StageTable) -> Self {
        Self { v1: t.base_value, blocks: t.bands, max_stage: t.max_stage }
    }
}

impl StageTable {
    pub fn new(base_value: f64, bands: Vec<StageBand>) -> Result<Self, ConfigError> {
        Self::with_max_stage(base_value, bands, DEFAULT_MAX_STAGE)
    }

    /// Overlapping or gapped bands are accepted; [`lookup`](Self::lookup)
    /// resolves them first-match, then last-band.
    pub fn with_max_stage(
        base_value: f64,
        bands: Vec<StageBand>,
        max_stage: u32,
    ) -> Result<Self, ConfigError> {
        if !(base_value.is_finite() && base_value > 0.0) {
            return Err(ConfigError::BaseValue(base_value));
        }
        if bands.is_empty() {
            return Err(ConfigError::NoBands);
        }
        if max_stage == 0 {
            return Err(ConfigError::MaxStage);
        }
        for (index, b) in bands.iter().enumerate() {
            if b.start_stage < 1 || b.end_stage < b.start_stage {
                return Err(ConfigError::BandRange {
                    index,
                    start: b.start_stage,
                    end: b.end_stage,
                });
            }
            if !(b.multiplier.is_finite() && b.multiplier > 0.0) {
                return Err(ConfigError::Multiplier { index, multiplier: b.multiplier });
            }
        }
        Ok(Self { base_value, bands, max_stage })
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn base_value(&self) -> f64 {
        self.base_value
    }
    pub fn bands(&self) -> &[StageBand] {
        &self.bands
    }
    pub fn max_stage(&self) -> u32 {
        self.max_stage
    }

    /// Multiplier of the first band containing `stage`; past the last band,
    /// the last band's multiplier. Never zero.
    pub fn lookup(&self, stage: u32) -> f64 {
        self.bands
            .iter()
            .find(|b| b.contains(stage))
            .or_else(|| self.bands.last())
            .map_or(1.0, |b| b.multiplier)
    }

    /// 1-based stage reached after `break_count` events: clamp(count + 1, 1, max).
    pub fn stage_for(&self, break_count: u64) -> u32 {
        let next = break_count.saturating_add(1);
        next.clamp(1, u64::from(self.max_stage)) as u32
    }
}

impl Default for StageTable {
    fn default() -> Self {
        let mut bands = vec![
            StageBand::new(1, 10, 1.6),
            StageBand::new(11, 20, 1.4),
            StageBand::new(21, 30, 1.3),
            StageBand::new(31, 40, 1.1),
            StageBand::new(41, 50, 1.05),
        ];
        bands.extend(
            (51..=DEFAULT_MAX_STAGE)
                .step_by(50)
                .map(|s| StageBand::new(s, s + 49, 1.001)),
        );
        Self { base_value: DEFAULT_BASE_VALUE, bands, max_stage: DEFAULT_MAX_STAGE }
    }
}
