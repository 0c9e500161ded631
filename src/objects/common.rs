//! Common types shared across COLLADA objects.
//!
//! This module contains the value types used throughout the model:
//! - [`Uri`] - A validated URI reference (`#id`, `textures/a.png`, ...)
//! - [`Color`] - An RGBA color
//! - [`WrapMode`] and [`FilterMode`] - Texture sampling tokens

use crate::decode::{is_delimiter, parse_f32};
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Namespaces and Constants
// ============================================================================

/// COLLADA 1.4 schema namespace
pub const XMLNS_COLLADA_14: &str = "http://www.collada.org/2005/11/COLLADASchema";

/// COLLADA 1.5 schema namespace
pub const XMLNS_COLLADA_15: &str = "http://www.collada.org/2008/03/COLLADASchema";

/// Base used only to check that relative references are well formed
const VALIDATION_BASE: &str = "file:///";

// ============================================================================
// URI References
// ============================================================================

/// A URI reference as written in the document.
///
/// The literal text is kept verbatim. Parsing checks that it is a valid
/// absolute URI or a valid reference relative to some base.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Uri(String);

impl Uri {
    /// Parses and validates a URI reference.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = |source| Error::InvalidUri {
            value: s.to_string(),
            source,
        };
        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(invalid(None));
        }
        match url::Url::parse(s) {
            Ok(_) => {}
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = url::Url::parse(VALIDATION_BASE).map_err(|e| invalid(Some(e)))?;
                base.join(s).map_err(|e| invalid(Some(e)))?;
            }
            Err(e) => return Err(invalid(Some(e))),
        }
        Ok(Uri(s.to_string()))
    }

    /// Returns the literal text of the reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the part after `#`, if any.
    pub fn fragment(&self) -> Option<&str> {
        self.0.split_once('#').map(|(_, f)| f)
    }

    /// Returns true for same-document references like `#geom-1`.
    pub fn is_local(&self) -> bool {
        self.0.starts_with('#')
    }

    /// Resolves this reference against `base`.
    pub fn resolve(&self, base: &url::Url) -> Result<url::Url> {
        base.join(&self.0).map_err(|e| Error::InvalidUri {
            value: self.0.clone(),
            source: Some(e),
        })
    }
}

impl FromStr for Uri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uri::parse(s)
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Colors
// ============================================================================

/// An RGBA color with float components.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha (1.0 when the source only gave RGB)
    pub a: f32,
}

impl Color {
    /// Creates an opaque color.
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Creates a color with alpha.
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Parses three or four whitespace-separated floats.
    fn from_str(s: &str) -> Result<Self> {
        let values = parse_float_list(s)?;
        match values.as_slice() {
            [r, g, b] => Ok(Color::rgb(*r, *g, *b)),
            [r, g, b, a] => Ok(Color::rgba(*r, *g, *b, *a)),
            _ => Err(Error::InvalidValueCount {
                element: "color".to_string(),
                expected: "3 or 4".to_string(),
                found: values.len(),
            }),
        }
    }
}

/// Parses a short whitespace-separated float list held in one string.
pub(crate) fn parse_float_list(s: &str) -> Result<Vec<f32>> {
    s.split(is_delimiter)
        .filter(|t| !t.is_empty())
        .map(parse_f32)
        .collect()
}

// ============================================================================
// Sampler Tokens
// ============================================================================

/// Texture coordinate wrap mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WrapMode {
    /// Repeat the texture
    Wrap,
    /// Repeat mirrored
    Mirror,
    /// Clamp to the edge texel
    Clamp,
    /// Use the border color
    Border,
    /// No wrapping
    None,
}

impl WrapMode {
    /// Returns the token used in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            WrapMode::Wrap => "WRAP",
            WrapMode::Mirror => "MIRROR",
            WrapMode::Clamp => "CLAMP",
            WrapMode::Border => "BORDER",
            WrapMode::None => "NONE",
        }
    }
}

impl FromStr for WrapMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "WRAP" => Ok(WrapMode::Wrap),
            "MIRROR" => Ok(WrapMode::Mirror),
            "CLAMP" => Ok(WrapMode::Clamp),
            "BORDER" => Ok(WrapMode::Border),
            "NONE" => Ok(WrapMode::None),
            _ => Err(Error::InvalidToken {
                kind: "wrap mode",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for WrapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Texture filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterMode {
    /// No filtering
    None,
    /// Nearest texel
    Nearest,
    /// Linear interpolation
    Linear,
    /// Nearest texel from nearest mipmap
    NearestMipmapNearest,
    /// Linear within nearest mipmap
    LinearMipmapNearest,
    /// Nearest texel, linear between mipmaps
    NearestMipmapLinear,
    /// Trilinear
    LinearMipmapLinear,
}

impl FilterMode {
    /// Returns the token used in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::None => "NONE",
            FilterMode::Nearest => "NEAREST",
            FilterMode::Linear => "LINEAR",
            FilterMode::NearestMipmapNearest => "NEAREST_MIPMAP_NEAREST",
            FilterMode::LinearMipmapNearest => "LINEAR_MIPMAP_NEAREST",
            FilterMode::NearestMipmapLinear => "NEAREST_MIPMAP_LINEAR",
            FilterMode::LinearMipmapLinear => "LINEAR_MIPMAP_LINEAR",
        }
    }
}

impl FromStr for FilterMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "NONE" => Ok(FilterMode::None),
            "NEAREST" => Ok(FilterMode::Nearest),
            "LINEAR" => Ok(FilterMode::Linear),
            "NEAREST_MIPMAP_NEAREST" => Ok(FilterMode::NearestMipmapNearest),
            "LINEAR_MIPMAP_NEAREST" => Ok(FilterMode::LinearMipmapNearest),
            "NEAREST_MIPMAP_LINEAR" => Ok(FilterMode::NearestMipmapLinear),
            "LINEAR_MIPMAP_LINEAR" => Ok(FilterMode::LinearMipmapLinear),
            _ => Err(Error::InvalidToken {
                kind: "filter mode",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_parse() {
        let uri = Uri::parse("test.jpg").unwrap();
        assert_eq!(uri.as_str(), "test.jpg");
        assert!(!uri.is_local());
        assert_eq!(uri.fragment(), None);

        let local: Uri = "#geom-1".parse().unwrap();
        assert!(local.is_local());
        assert_eq!(local.fragment(), Some("geom-1"));

        let abs = Uri::parse("http://example.com/scene.dae#node").unwrap();
        assert_eq!(abs.fragment(), Some("node"));
    }

    #[test]
    fn test_uri_invalid() {
        assert!(matches!(
            Uri::parse("bad name.png"),
            Err(Error::InvalidUri { source: None, .. })
        ));
        assert!(matches!(
            Uri::parse("http://[::1"),
            Err(Error::InvalidUri { source: Some(_), .. })
        ));
    }

    #[test]
    fn test_uri_resolve() {
        let base = url::Url::parse("file:///assets/scene.dae").unwrap();
        let uri = Uri::parse("textures/wood.png").unwrap();
        assert_eq!(
            uri.resolve(&base).unwrap().as_str(),
            "file:///assets/textures/wood.png"
        );
    }

    #[test]
    fn test_color_parse() {
        let c: Color = "0.5 0.25 1".parse().unwrap();
        assert_eq!(c, Color::rgb(0.5, 0.25, 1.0));

        let c: Color = " 1 0 0\n0.5 ".parse().unwrap();
        assert_eq!(c.a, 0.5);

        assert!(matches!(
            "1 0".parse::<Color>(),
            Err(Error::InvalidValueCount { found: 2, .. })
        ));
        assert!(matches!(
            "1 0 x".parse::<Color>(),
            Err(Error::InvalidFloat { .. })
        ));
    }

    #[test]
    fn test_sampler_tokens() {
        assert_eq!("MIRROR".parse::<WrapMode>().unwrap(), WrapMode::Mirror);
        assert_eq!(
            "LINEAR_MIPMAP_LINEAR".parse::<FilterMode>().unwrap(),
            FilterMode::LinearMipmapLinear
        );
        assert!(matches!(
            "linear".parse::<FilterMode>(),
            Err(Error::InvalidToken { kind: "filter mode", .. })
        ));
    }
}
