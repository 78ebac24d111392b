//! Palette snapping
//!
//! A palette is converted to HSL once and reused for every block of every
//! tile. Snapping picks the entry closest to the input colour.

use serde::{Deserialize, Serialize};

use super::{rgb_to_hsl, Hsl, Rgb};

/// How the distance between two HSL colours is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Plain Euclidean distance over the raw (h, s, l) triple.
    ///
    /// Hue is treated as a linear axis, so 359° and 1° are far apart. This is
    /// the historical behaviour of the brick tiles.
    #[default]
    Linear,
    /// Euclidean distance with hue difference taken around the colour wheel.
    Circular,
}

impl DistanceMetric {
    pub fn distance(self, a: &Hsl, b: &Hsl) -> f64 {
        let mut dh = (a.h - b.h).abs();
        if self == DistanceMetric::Circular {
            dh = dh.rem_euclid(360.0);
            dh = dh.min(360.0 - dh);
        }
        let ds = a.s - b.s;
        let dl = a.l - b.l;
        (dh * dh + ds * ds + dl * dl).sqrt()
    }
}

/// Immutable, ordered set of HSL colours
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    entries: Vec<Hsl>,
}

impl Palette {
    pub fn new(entries: Vec<Hsl>) -> Self {
        Self { entries }
    }

    /// Build a palette from RGB entries, converting each to HSL once.
    pub fn from_rgb(colors: &[Rgb]) -> Self {
        Self {
            entries: colors.iter().copied().map(rgb_to_hsl).collect(),
        }
    }

    pub fn entries(&self) -> &[Hsl] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snap `color` to the nearest palette entry.
    ///
    /// An empty palette passes the colour through. Ties go to the entry that
    /// comes first in palette order.
    pub fn snap(&self, color: Hsl, metric: DistanceMetric) -> Hsl {
        let mut best: Option<(f64, &Hsl)> = None;
        for entry in &self.entries {
            let d = metric.distance(&color, entry);
            match best {
                Some((best_d, _)) if d >= best_d => {}
                _ => best = Some((d, entry)),
            }
        }
        best.map(|(_, entry)| *entry).unwrap_or(color)
    }
}
