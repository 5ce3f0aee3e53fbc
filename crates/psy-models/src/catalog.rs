use crate::error::{ModelError, ModelResult};
use crate::formula::{FormulaId, Surface, ValidityRange};
use crate::saturation::{
    ExponentialCoefficients, GiliCoefficients, GoffGratchCoefficients, MartiCoefficients,
    SaturationModel, WexlerCoefficients,
};

/// One saturation formula: identity, surface, validity interval and evaluation model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormulaEntry {
    pub id: FormulaId,
    pub display_name: &'static str,
    pub aliases: &'static [&'static str],
    pub surface: Surface,
    /// Interval tested against the wet-bulb/target temperature, never the dry bulb.
    pub validity: ValidityRange,
    pub model: SaturationModel,
    /// Reference saturation pressure at 0 °C [hPa].
    pub esat_at_zero_hpa: f64,
}

impl FormulaEntry {
    pub fn name(&self) -> &'static str {
        self.id.as_str()
    }

    pub fn is_valid_at(&self, t_c: f64) -> bool {
        self.validity.contains(t_c)
    }

    pub fn esat(&self, t_c: f64) -> ModelResult<f64> {
        self.model.esat(t_c)
    }

    pub fn desat_dt(&self, t_c: f64) -> ModelResult<f64> {
        self.model.desat_dt(t_c)
    }

    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_ascii_lowercase();
        if query.is_empty() {
            return true;
        }

        self.name().contains(&query)
            || self.display_name.to_ascii_lowercase().contains(&query)
            || self
                .aliases
                .iter()
                .any(|alias| alias.to_ascii_lowercase().contains(&query))
    }
}

const GOFF_WATER: GoffGratchCoefficients = GoffGratchCoefficients {
    reference_k: 273.15,
    b: 10.795_74,
    c: -5.028_08,
    d: 1.504_75e-4,
    d_exp: -8.2969,
    f: 0.428_73e-3,
    f_exp: 4.769_55,
    h: 0.786_14,
    i: 0.0,
};

const GOFF_STEAM_WATER: GoffGratchCoefficients = GoffGratchCoefficients {
    reference_k: 373.15,
    b: 7.902_98,
    c: -5.028_08,
    d: 1.3816e-7,
    d_exp: -11.344,
    f: 8.1328e-3,
    f_exp: 3.491_49,
    h: 3.005_714_9,
    i: 0.0,
};

const GOFF_ICE: GoffGratchCoefficients = GoffGratchCoefficients {
    reference_k: 273.15,
    b: 9.097_18,
    c: 3.566_54,
    d: 0.0,
    d_exp: 0.0,
    f: 0.0,
    f_exp: 0.0,
    h: 0.786_14,
    i: 0.876_793,
};

const WEXLER_WATER: WexlerCoefficients = WexlerCoefficients {
    g: [
        -5800.2206,
        1.391_499_3,
        -0.048_640_239,
        0.417_647_68e-4,
        -0.144_520_93e-7,
        0.0,
        6.545_967_3,
    ],
};

const WEXLER_ICE: WexlerCoefficients = WexlerCoefficients {
    g: [
        -5674.5359,
        6.392_524_7,
        -0.009_677_843,
        0.622_157_01e-6,
        0.207_478_25e-8,
        -0.948_402_4e-12,
        4.163_501_9,
    ],
};

const fn exponential(a: f64, b: f64, c: f64) -> SaturationModel {
    SaturationModel::Exponential(ExponentialCoefficients { a, b, c })
}

const FORMULA_CATALOG: [FormulaEntry; 14] = [
    FormulaEntry {
        id: FormulaId::GoffWater,
        display_name: "Goff-Gratch (water)",
        aliases: &["goff-gratch", "wmo"],
        surface: Surface::Water,
        validity: ValidityRange::new(-10.0, 100.0),
        model: SaturationModel::GoffGratch(GOFF_WATER),
        esat_at_zero_hpa: 6.111_390,
    },
    FormulaEntry {
        id: FormulaId::WexlerWater,
        display_name: "Wexler (water)",
        aliases: &["hyland-wexler"],
        surface: Surface::Water,
        validity: ValidityRange::new(-10.0, 200.0),
        model: SaturationModel::Wexler(WEXLER_WATER),
        esat_at_zero_hpa: 6.112_129,
    },
    FormulaEntry {
        id: FormulaId::BuckWater,
        display_name: "Buck (water)",
        aliases: &["buck-1981"],
        surface: Surface::Water,
        validity: ValidityRange::new(0.0, 80.0),
        model: exponential(6.1121, 17.502, 240.97),
        esat_at_zero_hpa: 6.1121,
    },
    FormulaEntry {
        id: FormulaId::TetensWater,
        display_name: "Tetens (water)",
        aliases: &["tetens"],
        surface: Surface::Water,
        validity: ValidityRange::new(0.0, 50.0),
        model: exponential(6.1078, 17.269, 237.3),
        esat_at_zero_hpa: 6.1078,
    },
    FormulaEntry {
        id: FormulaId::MagnusWater,
        display_name: "Magnus (water)",
        aliases: &["magnus", "sonntag"],
        surface: Surface::Water,
        validity: ValidityRange::new(0.0, 60.0),
        model: exponential(6.112, 17.62, 243.12),
        esat_at_zero_hpa: 6.112,
    },
    FormulaEntry {
        id: FormulaId::AugustWater,
        display_name: "August-Roche-Magnus (water)",
        aliases: &["august", "alduchov-eskridge"],
        surface: Surface::Water,
        validity: ValidityRange::new(0.0, 60.0),
        model: exponential(6.1094, 17.625, 243.04),
        esat_at_zero_hpa: 6.1094,
    },
    FormulaEntry {
        id: FormulaId::ArdenWater,
        display_name: "Arden Buck (water, enhanced)",
        aliases: &["arden"],
        surface: Surface::Water,
        validity: ValidityRange::new(0.0, 100.0),
        model: exponential(6.1121, 18.678, 257.14),
        esat_at_zero_hpa: 6.1121,
    },
    FormulaEntry {
        id: FormulaId::GiliWater,
        display_name: "Gili (water)",
        aliases: &["gili"],
        surface: Surface::Water,
        validity: ValidityRange::new(-10.0, 20.0),
        model: SaturationModel::Gili(GiliCoefficients),
        esat_at_zero_hpa: 5.926_077,
    },
    FormulaEntry {
        id: FormulaId::GoffSteamWater,
        display_name: "Goff-Gratch (water, steam point)",
        aliases: &["goff-1946"],
        surface: Surface::Water,
        validity: ValidityRange::new(-10.0, 100.0),
        model: SaturationModel::GoffGratch(GOFF_STEAM_WATER),
        esat_at_zero_hpa: 6.106_608,
    },
    FormulaEntry {
        id: FormulaId::GoffIce,
        display_name: "Goff-Gratch (ice)",
        aliases: &["goff-gratch-ice"],
        surface: Surface::Ice,
        validity: ValidityRange::new(-100.0, 10.0),
        model: SaturationModel::GoffGratch(GOFF_ICE),
        esat_at_zero_hpa: 6.111_390,
    },
    FormulaEntry {
        id: FormulaId::WexlerIce,
        display_name: "Wexler (ice)",
        aliases: &["hyland-wexler-ice"],
        surface: Surface::Ice,
        validity: ValidityRange::new(-150.0, 10.0),
        model: SaturationModel::Wexler(WEXLER_ICE),
        esat_at_zero_hpa: 6.111_536,
    },
    FormulaEntry {
        id: FormulaId::MagnusIce,
        display_name: "Magnus (ice)",
        aliases: &["magnus-ice"],
        surface: Surface::Ice,
        validity: ValidityRange::new(-65.0, 0.0),
        model: exponential(6.112, 22.46, 272.62),
        esat_at_zero_hpa: 6.112,
    },
    FormulaEntry {
        id: FormulaId::BuckIce,
        display_name: "Buck (ice)",
        aliases: &["buck-ice"],
        surface: Surface::Ice,
        validity: ValidityRange::new(-80.0, 0.0),
        model: exponential(6.1115, 22.452, 272.55),
        esat_at_zero_hpa: 6.1115,
    },
    FormulaEntry {
        id: FormulaId::MartiIce,
        display_name: "Marti-Mauersberger (ice)",
        aliases: &["marti"],
        surface: Surface::Ice,
        validity: ValidityRange::new(-150.0, 0.0),
        model: SaturationModel::Marti(MartiCoefficients {
            a: -2663.5,
            b: 12.537,
        }),
        esat_at_zero_hpa: 6.108_681,
    },
];

/// Every formula in fixed order; row N of a session corresponds to entry N.
pub fn formula_catalog() -> &'static [FormulaEntry] {
    &FORMULA_CATALOG
}

/// Catalog entry for an id.
pub fn entry(id: FormulaId) -> &'static FormulaEntry {
    // FORMULA_CATALOG is declared in FormulaId::ALL order
    &FORMULA_CATALOG[id as usize]
}

/// Look up a formula by its identifier string.
pub fn formula(name: &str) -> ModelResult<&'static FormulaEntry> {
    let id: FormulaId = name.parse()?;
    Ok(entry(id))
}

/// Entries whose id, display name or aliases contain `query` (case-insensitive).
pub fn find_formula(query: &str) -> Vec<FormulaEntry> {
    formula_catalog()
        .iter()
        .copied()
        .filter(|entry| entry.matches_query(query))
        .collect()
}

/// `esat(T, formula)` by formula name [hPa].
pub fn esat(t_c: f64, formula_name: &str) -> ModelResult<f64> {
    formula(formula_name)?.esat(t_c)
}

/// `desat_dT(T, formula)` by formula name [hPa/°C].
pub fn desat_dt(t_c: f64, formula_name: &str) -> ModelResult<f64> {
    formula(formula_name)?.desat_dt(t_c)
}
