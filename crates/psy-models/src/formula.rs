//! Formula identity, surface and validity range.

use core::fmt;
use core::str::FromStr;

use crate::error::ModelError;

/// Stable identifier for every saturation formula in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum FormulaId {
    GoffWater,
    WexlerWater,
    BuckWater,
    TetensWater,
    MagnusWater,
    AugustWater,
    ArdenWater,
    GiliWater,
    GoffSteamWater,
    GoffIce,
    WexlerIce,
    MagnusIce,
    BuckIce,
    MartiIce,
}

impl FormulaId {
    pub const ALL: [FormulaId; 14] = [
        Self::GoffWater,
        Self::WexlerWater,
        Self::BuckWater,
        Self::TetensWater,
        Self::MagnusWater,
        Self::AugustWater,
        Self::ArdenWater,
        Self::GiliWater,
        Self::GoffSteamWater,
        Self::GoffIce,
        Self::WexlerIce,
        Self::MagnusIce,
        Self::BuckIce,
        Self::MartiIce,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GoffWater => "goff-water",
            Self::WexlerWater => "wexler-water",
            Self::BuckWater => "buck-water",
            Self::TetensWater => "tetens-water",
            Self::MagnusWater => "magnus-water",
            Self::AugustWater => "august-water",
            Self::ArdenWater => "arden-water",
            Self::GiliWater => "gili-water",
            Self::GoffSteamWater => "goff-steam-water",
            Self::GoffIce => "goff-ice",
            Self::WexlerIce => "wexler-ice",
            Self::MagnusIce => "magnus-ice",
            Self::BuckIce => "buck-ice",
            Self::MartiIce => "marti-ice",
        }
    }
}

impl fmt::Display for FormulaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormulaId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        FormulaId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ModelError::UnknownFormula {
                name: s.to_string(),
            })
    }
}

/// Surface the vapour is in equilibrium with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Surface {
    Water,
    Ice,
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Water => write!(f, "water"),
            Self::Ice => write!(f, "ice"),
        }
    }
}

/// Closed temperature interval [°C] over which an empirical formula is trusted.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValidityRange {
    pub min_c: f64,
    pub max_c: f64,
}

impl ValidityRange {
    pub const fn new(min_c: f64, max_c: f64) -> Self {
        Self { min_c, max_c }
    }

    pub fn contains(&self, t_c: f64) -> bool {
        (self.min_c..=self.max_c).contains(&t_c)
    }
}

impl fmt::Display for ValidityRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}] °C", self.min_c, self.max_c)
    }
}
