//! Cameras and their projections.

use crate::error::{Error, Result};
use crate::objects::ownership::DocumentId;

/// A perspective projection. Field of view is in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Perspective {
    /// Horizontal field of view
    pub xfov: Option<f32>,
    /// Vertical field of view
    pub yfov: Option<f32>,
    /// Width over height
    pub aspect_ratio: Option<f32>,
    /// Near clip distance
    pub znear: f32,
    /// Far clip distance
    pub zfar: f32,
}

impl Perspective {
    /// Creates a projection with only the clip planes set.
    pub fn new(znear: f32, zfar: f32) -> Self {
        Self {
            xfov: None,
            yfov: None,
            aspect_ratio: None,
            znear,
            zfar,
        }
    }
}

/// An orthographic projection. Magnifications are half-extents.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Orthographic {
    /// Horizontal magnification
    pub xmag: Option<f32>,
    /// Vertical magnification
    pub ymag: Option<f32>,
    /// Width over height
    pub aspect_ratio: Option<f32>,
    /// Near clip distance
    pub znear: f32,
    /// Far clip distance
    pub zfar: f32,
}

impl Orthographic {
    /// Creates a projection with only the clip planes set.
    pub fn new(znear: f32, zfar: f32) -> Self {
        Self {
            xmag: None,
            ymag: None,
            aspect_ratio: None,
            znear,
            zfar,
        }
    }
}

/// Either an aspect ratio or both dimensions, never both and never neither.
fn check_exclusive(
    kind: &str,
    x: Option<f32>,
    y: Option<f32>,
    aspect_ratio: Option<f32>,
) -> Result<()> {
    let both_dimensions = x.is_some() && y.is_some();
    match (aspect_ratio.is_some(), both_dimensions) {
        (true, true) => Err(Error::InvalidProjection(format!(
            "{} sets aspect_ratio together with both dimensions",
            kind
        ))),
        (false, false) => Err(Error::InvalidProjection(format!(
            "{} needs aspect_ratio or both dimensions",
            kind
        ))),
        _ => Ok(()),
    }
}

fn check_perspective(builder: &PerspectiveBuilder) -> Result<()> {
    check_exclusive(
        "perspective",
        builder.xfov,
        builder.yfov,
        builder.aspect_ratio,
    )
}

fn check_orthographic(builder: &OrthographicBuilder) -> Result<()> {
    check_exclusive(
        "orthographic",
        builder.xmag,
        builder.ymag,
        builder.aspect_ratio,
    )
}

entity_builder! {
    /// Builder for [`Perspective`].
    PerspectiveBuilder => Perspective {
        required { znear: f32, zfar: f32 }
        optional { xfov: f32, yfov: f32, aspect_ratio: f32 }
        collections {}
        construct: Perspective::new,
        validate: check_perspective,
    }
}

entity_builder! {
    /// Builder for [`Orthographic`].
    OrthographicBuilder => Orthographic {
        required { znear: f32, zfar: f32 }
        optional { xmag: f32, ymag: f32, aspect_ratio: f32 }
        collections {}
        construct: Orthographic::new,
        validate: check_orthographic,
    }
}

/// The projection of a camera's optics.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Projection {
    /// `<perspective>`
    Perspective(Perspective),
    /// `<orthographic>`
    Orthographic(Orthographic),
}

impl Projection {
    /// Near clip distance.
    pub fn znear(&self) -> f32 {
        match self {
            Projection::Perspective(p) => p.znear,
            Projection::Orthographic(o) => o.znear,
        }
    }

    /// Far clip distance.
    pub fn zfar(&self) -> f32 {
        match self {
            Projection::Perspective(p) => p.zfar,
            Projection::Orthographic(o) => o.zfar,
        }
    }
}

/// A camera from `<library_cameras>`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Camera {
    /// Document-wide identifier
    pub id: Option<String>,
    /// Human-readable name
    pub name: Option<String>,
    /// Projection
    pub projection: Projection,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl Camera {
    /// Creates a camera with the given projection.
    pub fn new(projection: Projection) -> Self {
        Self {
            id: None,
            name: None,
            projection,
            document: None,
        }
    }
}

document_aware!(Camera);
impl_element!(Camera);

entity_builder! {
    /// Builder for [`Camera`].
    CameraBuilder => Camera {
        required { projection: Projection }
        optional { id: String, name: String }
        collections {}
        construct: Camera::new,
    }
}
