use serde::{Deserialize, Serialize};

use crate::error::{LocResult, LocalizerError};
use crate::smoothing::BlurKernel;

pub const DEFAULT_P_HIT: f64 = 0.6;
pub const DEFAULT_P_MISS: f64 = 0.2;
pub const DEFAULT_BLURRING: f64 = 0.12;

/// Binary hit/miss color sensor
///
/// `p_hit > p_miss` makes the sensor better than chance; that ordering is
/// expected but not enforced.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorModel {
    pub p_hit: f64,
    pub p_miss: f64,
}

impl SensorModel {
    pub fn new(p_hit: f64, p_miss: f64) -> LocResult<Self> {
        for (name, value) in [("p_hit", p_hit), ("p_miss", p_miss)] {
            if !value.is_finite() || value < 0.0 {
                return Err(LocalizerError::InvalidParameters(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(SensorModel { p_hit, p_miss })
    }

    /// Likelihood multiplier for a cell whose color did (or did not) match
    pub fn likelihood(&self, hit: bool) -> f64 {
        if hit {
            self.p_hit
        } else {
            self.p_miss
        }
    }

    /// Probability that a reading reports the true color
    ///
    /// 0.5 when both likelihoods are zero.
    pub fn hit_rate(&self) -> f64 {
        let total = self.p_hit + self.p_miss;
        if total > 0.0 {
            self.p_hit / total
        } else {
            0.5
        }
    }
}

/// Filter tuning loaded from scenario files and overridden from the CLI
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub p_hit: f64,
    pub p_miss: f64,
    pub blurring: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            p_hit: DEFAULT_P_HIT,
            p_miss: DEFAULT_P_MISS,
            blurring: DEFAULT_BLURRING,
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> LocResult<()> {
        self.sensor_model()?;
        BlurKernel::new(self.blurring)?;
        Ok(())
    }

    pub fn sensor_model(&self) -> LocResult<SensorModel> {
        SensorModel::new(self.p_hit, self.p_miss)
    }

    /// Replace any field given on the command line
    pub fn with_overrides(
        self,
        p_hit: Option<f64>,
        p_miss: Option<f64>,
        blurring: Option<f64>,
    ) -> Self {
        FilterConfig {
            p_hit: p_hit.unwrap_or(self.p_hit),
            p_miss: p_miss.unwrap_or(self.p_miss),
            blurring: blurring.unwrap_or(self.blurring),
        }
    }
}
