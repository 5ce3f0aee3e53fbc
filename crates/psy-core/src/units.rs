// psy-core/src/units.rs
//
// The core boundary is canonical: temperatures in °C, pressures in hPa.
// Presentation layers convert to and from display units with the helpers below.

use core::fmt;
use core::str::FromStr;

use uom::si::f64::{Pressure as UomPressure, ThermodynamicTemperature as UomThermodynamicTemperature};
use uom::si::pressure::{bar, centimeter_of_mercury, hectopascal, millimeter_of_mercury, pascal};
use uom::si::thermodynamic_temperature::{degree_celsius, degree_fahrenheit, kelvin};

use crate::PsyError;

// Public canonical unit types (SI, f64)
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;

#[inline]
pub fn degc(v: f64) -> Temperature {
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn hpa(v: f64) -> Pressure {
    Pressure::new::<hectopascal>(v)
}

/// Celsius to absolute temperature.
#[inline]
pub fn celsius_to_kelvin(t_c: f64) -> f64 {
    t_c + constants::KELVIN_OFFSET
}

/// Display units accepted for temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Kelvin,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Kelvin => "K",
            Self::Fahrenheit => "°F",
        }
    }

    fn quantity(self, v: f64) -> Temperature {
        match self {
            Self::Celsius => Temperature::new::<degree_celsius>(v),
            Self::Kelvin => Temperature::new::<kelvin>(v),
            Self::Fahrenheit => Temperature::new::<degree_fahrenheit>(v),
        }
    }

    /// Convert a value expressed in this unit to °C.
    pub fn to_celsius(self, v: f64) -> f64 {
        self.quantity(v).get::<degree_celsius>()
    }

    /// Convert a °C value to this unit.
    pub fn from_celsius(self, t_c: f64) -> f64 {
        let t = degc(t_c);
        match self {
            Self::Celsius => t.get::<degree_celsius>(),
            Self::Kelvin => t.get::<kelvin>(),
            Self::Fahrenheit => t.get::<degree_fahrenheit>(),
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = PsyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "degc" | "celsius" | "°c" => Ok(Self::Celsius),
            "k" | "kelvin" => Ok(Self::Kelvin),
            "f" | "degf" | "fahrenheit" | "°f" => Ok(Self::Fahrenheit),
            _ => Err(PsyError::UnknownUnit {
                unit: s.to_string(),
                quantity: "temperature",
            }),
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Display units accepted for pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PressureUnit {
    #[default]
    HectoPascal,
    Pascal,
    MillimeterOfMercury,
    CentimeterOfMercury,
    Bar,
}

impl PressureUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::HectoPascal => "hPa",
            Self::Pascal => "Pa",
            Self::MillimeterOfMercury => "mmHg",
            Self::CentimeterOfMercury => "cmHg",
            Self::Bar => "bar",
        }
    }

    fn quantity(self, v: f64) -> Pressure {
        match self {
            Self::HectoPascal => Pressure::new::<hectopascal>(v),
            Self::Pascal => Pressure::new::<pascal>(v),
            Self::MillimeterOfMercury => Pressure::new::<millimeter_of_mercury>(v),
            Self::CentimeterOfMercury => Pressure::new::<centimeter_of_mercury>(v),
            Self::Bar => Pressure::new::<bar>(v),
        }
    }

    /// Convert a value expressed in this unit to hPa.
    pub fn to_hpa(self, v: f64) -> f64 {
        self.quantity(v).get::<hectopascal>()
    }

    /// Convert an hPa value to this unit.
    pub fn from_hpa(self, p_hpa: f64) -> f64 {
        let p = hpa(p_hpa);
        match self {
            Self::HectoPascal => p.get::<hectopascal>(),
            Self::Pascal => p.get::<pascal>(),
            Self::MillimeterOfMercury => p.get::<millimeter_of_mercury>(),
            Self::CentimeterOfMercury => p.get::<centimeter_of_mercury>(),
            Self::Bar => p.get::<bar>(),
        }
    }
}

impl FromStr for PressureUnit {
    type Err = PsyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hpa" | "mbar" => Ok(Self::HectoPascal),
            "pa" => Ok(Self::Pascal),
            "mmhg" => Ok(Self::MillimeterOfMercury),
            "cmhg" => Ok(Self::CentimeterOfMercury),
            "bar" => Ok(Self::Bar),
            _ => Err(PsyError::UnknownUnit {
                unit: s.to_string(),
                quantity: "pressure",
            }),
        }
    }
}

impl fmt::Display for PressureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

pub mod constants {
    pub const G0_MPS2: f64 = 9.806_65;
    pub const KELVIN_OFFSET: f64 = 273.15;

    /// Universal gas constant [J/(mol·K)]
    pub const R_UNIVERSAL: f64 = 8.314_462_618;
    /// Molar mass of water vapour [g/mol]
    pub const M_WATER: f64 = 18.015_28;
    /// Molar mass of dry air [g/mol]
    pub const M_DRY_AIR: f64 = 28.964_7;
    /// Specific gas constant of dry air [J/(kg·K)]
    pub const R_DRY_AIR: f64 = 1000.0 * R_UNIVERSAL / M_DRY_AIR;
    /// Specific gas constant of water vapour [J/(kg·K)]
    pub const R_VAPOR: f64 = 1000.0 * R_UNIVERSAL / M_WATER;
    /// Ratio of molar masses, water vapour over dry air.
    pub const EPSILON: f64 = M_WATER / M_DRY_AIR;
    /// Reference pressure for potential temperatures [hPa]
    pub const P_REF_HPA: f64 = 1000.0;
    pub const STANDARD_PRESSURE_HPA: f64 = 1013.25;
}
