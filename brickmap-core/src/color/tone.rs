//! HSL tone adjustments

use serde::{Deserialize, Serialize};

use super::Hsl;

/// Per-session tone settings.
///
/// `darken` and `lighten` are mutually exclusive; when both are set,
/// `darken` wins. No result is clamped.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ToneFilter {
    /// Multiplicative factor on saturation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturate: Option<f64>,
    /// Fraction of lightness to remove, 0 to 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub darken: Option<f64>,
    /// Multiplicative factor on lightness
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lighten: Option<f64>,
    /// Percentage points added to saturation after `saturate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturation_offset: Option<f64>,
    /// Percentage points added to lightness after darken / lighten
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lightness_offset: Option<f64>,
}

impl ToneFilter {
    pub fn is_identity(&self) -> bool {
        self.saturate.is_none()
            && self.darken.is_none()
            && self.lighten.is_none()
            && self.saturation_offset.is_none()
            && self.lightness_offset.is_none()
    }

    /// Fixed boost used by the lego tile style: +60 saturation, +10 lightness.
    pub fn lego() -> Self {
        Self {
            saturation_offset: Some(60.0),
            lightness_offset: Some(10.0),
            ..Default::default()
        }
    }

    pub fn apply_saturate(&self, mut color: Hsl) -> Hsl {
        if let Some(factor) = self.saturate {
            color.s *= factor;
        }
        if let Some(offset) = self.saturation_offset {
            color.s += offset;
        }
        color
    }

    pub fn apply_lightness(&self, mut color: Hsl) -> Hsl {
        if let Some(amount) = self.darken {
            color.l -= color.l * amount;
        } else if let Some(factor) = self.lighten {
            color.l *= factor;
        }
        if let Some(offset) = self.lightness_offset {
            color.l += offset;
        }
        color
    }

    /// Saturation then lightness, without any palette step in between.
    pub fn apply(&self, color: Hsl) -> Hsl {
        self.apply_lightness(self.apply_saturate(color))
    }
}
