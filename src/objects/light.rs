//! Light sources.

use crate::error::{Error, Result};
use crate::objects::common::Color;
use crate::objects::ownership::DocumentId;
use std::fmt;
use std::str::FromStr;

/// Kind of light, taken from the element under `<technique_common>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LightType {
    /// Uniform ambient light
    Ambient,
    /// Parallel rays along -Z
    Directional,
    /// Omnidirectional point light
    Point,
    /// Cone-shaped spot light
    Spot,
}

impl LightType {
    /// Returns the element name of this light type.
    pub fn as_str(&self) -> &'static str {
        match self {
            LightType::Ambient => "ambient",
            LightType::Directional => "directional",
            LightType::Point => "point",
            LightType::Spot => "spot",
        }
    }
}

impl FromStr for LightType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ambient" => Ok(LightType::Ambient),
            "directional" => Ok(LightType::Directional),
            "point" => Ok(LightType::Point),
            "spot" => Ok(LightType::Spot),
            _ => Err(Error::InvalidToken {
                kind: "light type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for LightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A light from `<library_lights>`.
///
/// Attenuation applies to point and spot lights, falloff to spot lights
/// only; other types leave those fields unset.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Light {
    /// Document-wide identifier
    pub id: Option<String>,
    /// Human-readable name
    pub name: Option<String>,
    /// Light type
    pub light_type: LightType,
    /// Light color
    pub color: Color,
    #[allow(missing_docs)]
    pub constant_attenuation: Option<f32>,
    #[allow(missing_docs)]
    pub linear_attenuation: Option<f32>,
    #[allow(missing_docs)]
    pub quadratic_attenuation: Option<f32>,
    /// Cone angle in degrees
    pub falloff_angle: Option<f32>,
    #[allow(missing_docs)]
    pub falloff_exponent: Option<f32>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl Light {
    /// Creates a light of the given type and color.
    pub fn new(light_type: LightType, color: Color) -> Self {
        Self {
            id: None,
            name: None,
            light_type,
            color,
            constant_attenuation: None,
            linear_attenuation: None,
            quadratic_attenuation: None,
            falloff_angle: None,
            falloff_exponent: None,
            document: None,
        }
    }
}

document_aware!(Light);
impl_element!(Light);

entity_builder! {
    /// Builder for [`Light`].
    LightBuilder => Light {
        required { light_type: LightType, color: Color }
        optional {
            id: String,
            name: String,
            constant_attenuation: f32,
            linear_attenuation: f32,
            quadratic_attenuation: f32,
            falloff_angle: f32,
            falloff_exponent: f32,
        }
        collections {}
        construct: Light::new,
    }
}
