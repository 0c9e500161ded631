//! Asset metadata attached to the document.

use crate::error::{Error, Result};
use crate::objects::ownership::DocumentId;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

/// Which axis points up in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UpAxis {
    /// X_UP
    X,
    /// Y_UP (the COLLADA default)
    #[default]
    Y,
    /// Z_UP
    Z,
}

impl UpAxis {
    /// Returns the token used in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            UpAxis::X => "X_UP",
            UpAxis::Y => "Y_UP",
            UpAxis::Z => "Z_UP",
        }
    }
}

impl FromStr for UpAxis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "X_UP" => Ok(UpAxis::X),
            "Y_UP" => Ok(UpAxis::Y),
            "Z_UP" => Ok(UpAxis::Z),
            _ => Err(Error::InvalidToken {
                kind: "up axis",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for UpAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Distance unit of the document.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    /// Unit name, e.g. "centimeter"
    pub name: Option<String>,
    /// Length of one unit in meters
    pub meter: f64,
}

impl Default for Unit {
    fn default() -> Self {
        Self {
            name: Some("meter".to_string()),
            meter: 1.0,
        }
    }
}

/// One author/tool entry of the asset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Contributor {
    /// Author name
    pub author: Option<String>,
    /// Tool that produced the document
    pub authoring_tool: Option<String>,
    /// Free-form comments
    pub comments: Option<String>,
    /// Copyright notice
    pub copyright: Option<String>,
}

/// Document-level metadata from `<asset>`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Asset {
    /// Creation time
    pub created: DateTime<FixedOffset>,
    /// Last modification time
    pub modified: DateTime<FixedOffset>,
    /// Contributors, in document order
    pub contributors: Vec<Contributor>,
    /// Title
    pub title: Option<String>,
    /// Subject
    pub subject: Option<String>,
    /// Keywords
    pub keywords: Option<String>,
    /// Revision string
    pub revision: Option<String>,
    /// Distance unit
    pub unit: Option<Unit>,
    /// Up axis
    pub up_axis: Option<UpAxis>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl Asset {
    /// Creates asset metadata with the two mandatory timestamps.
    pub fn new(created: DateTime<FixedOffset>, modified: DateTime<FixedOffset>) -> Self {
        Self {
            created,
            modified,
            contributors: Vec::new(),
            title: None,
            subject: None,
            keywords: None,
            revision: None,
            unit: None,
            up_axis: None,
            document: None,
        }
    }

    /// Returns the up axis, falling back to the COLLADA default.
    pub fn up_axis_or_default(&self) -> UpAxis {
        self.up_axis.unwrap_or_default()
    }

    /// Returns the unit length in meters, falling back to 1.0.
    pub fn meters_per_unit(&self) -> f64 {
        self.unit.as_ref().map_or(1.0, |u| u.meter)
    }
}

document_aware!(Asset);

entity_builder! {
    /// Builder for [`Asset`].
    AssetBuilder => Asset {
        required { created: DateTime<FixedOffset>, modified: DateTime<FixedOffset> }
        optional {
            title: String,
            subject: String,
            keywords: String,
            revision: String,
            unit: Unit,
            up_axis: UpAxis,
        }
        collections { contributors: Vec<Contributor> }
        construct: Asset::new,
    }
}

entity_builder! {
    /// Builder for [`Contributor`].
    ContributorBuilder => Contributor {
        required {}
        optional {
            author: String,
            authoring_tool: String,
            comments: String,
            copyright: String,
        }
        collections {}
        construct: Contributor::default,
    }
}

/// Parses an ISO 8601 timestamp as used by `<created>` and `<modified>`.
///
/// Timestamps without a zone are taken as UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }

    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M:%S%:z",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
    ];

    for fmt in formats {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&naive).fixed_offset());
        }
    }

    Err(Error::InvalidTimestamp(format!(
        "Cannot parse timestamp: {}",
        s
    )))
}
