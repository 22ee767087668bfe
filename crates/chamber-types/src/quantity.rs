//! Unit-tagged physical quantities.
//!
//! Lengths are normalised to millimetres and angles to degrees when parsed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ParseError;

/// Physical dimension of a parsed quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Length,
    Angle,
    Dimensionless,
}

/// A numeric value with its dimension, in internal units (mm, degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub dimension: Dimension,
}

const LENGTH_UNITS: &[(&str, f64)] = &[
    ("mm", 1.0),
    ("cm", 10.0),
    ("um", 1e-3),
    ("µm", 1e-3),
    ("nm", 1e-6),
    ("in", 25.4),
    ("m", 1000.0),
];

const ANGLE_UNITS: &[(&str, f64)] = &[
    ("deg", 1.0),
    ("°", 1.0),
    ("rad", 180.0 / std::f64::consts::PI),
];

impl Quantity {
    pub fn length(mm: f64) -> Self {
        Self {
            value: mm,
            dimension: Dimension::Length,
        }
    }

    pub fn angle(degrees: f64) -> Self {
        Self {
            value: degrees,
            dimension: Dimension::Angle,
        }
    }

    pub fn scalar(value: f64) -> Self {
        Self {
            value,
            dimension: Dimension::Dimensionless,
        }
    }

    /// Parse text such as `"20mm"`, `"0.02 m"`, `"18.65deg"` or `"3"`.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let trimmed = text.trim();
        let split = trimmed
            .char_indices()
            .find(|(_, c)| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
            .map(|(i, _)| i)
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);
        let value: f64 = number.parse().map_err(|_| ParseError::InvalidQuantity {
            text: text.to_string(),
            reason: format!("'{number}' is not a number"),
        })?;
        if !value.is_finite() {
            return Err(ParseError::InvalidQuantity {
                text: text.to_string(),
                reason: "value is not finite".to_string(),
            });
        }

        let unit = unit.trim();
        if unit.is_empty() {
            return Ok(Self::scalar(value));
        }
        if let Some((_, factor)) = LENGTH_UNITS.iter().find(|(u, _)| *u == unit) {
            return Ok(Self::length(value * factor));
        }
        if let Some((_, factor)) = ANGLE_UNITS.iter().find(|(u, _)| *u == unit) {
            return Ok(Self::angle(value * factor));
        }
        Err(ParseError::InvalidQuantity {
            text: text.to_string(),
            reason: format!("unknown unit '{unit}'"),
        })
    }

    /// Value in millimetres. A bare number is taken as millimetres.
    pub fn as_length(&self, name: &str) -> Result<f64, ParseError> {
        self.expect(name, Dimension::Length)
    }

    /// Value in degrees. A bare number is taken as degrees.
    pub fn as_angle(&self, name: &str) -> Result<f64, ParseError> {
        self.expect(name, Dimension::Angle)
    }

    pub fn as_scalar(&self, name: &str) -> Result<f64, ParseError> {
        self.expect(name, Dimension::Dimensionless)
    }

    fn expect(&self, name: &str, expected: Dimension) -> Result<f64, ParseError> {
        if self.dimension == expected || self.dimension == Dimension::Dimensionless {
            Ok(self.value)
        } else {
            Err(ParseError::WrongDimension {
                name: name.to_string(),
                expected,
                found: self.dimension,
            })
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dimension {
            Dimension::Length => write!(f, "{} mm", self.value),
            Dimension::Angle => write!(f, "{} deg", self.value),
            Dimension::Dimensionless => write!(f, "{}", self.value),
        }
    }
}
