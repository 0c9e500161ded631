//! Image - a texture source referenced by effects.

use crate::objects::common::Uri;
use crate::objects::ownership::DocumentId;

/// An image from `<library_images>`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Image {
    /// Document-wide identifier
    pub id: Option<String>,
    /// Human-readable name
    pub name: Option<String>,
    /// Where the image data lives (`<init_from>`)
    pub source: Uri,
    /// Pixel format hint
    pub format: Option<String>,
    /// Width in pixels
    pub width: Option<u32>,
    /// Height in pixels
    pub height: Option<u32>,
    /// Depth in pixels (3D images)
    pub depth: Option<u32>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl Image {
    /// Creates an image loaded from `source`.
    pub fn new(source: Uri) -> Self {
        Self {
            id: None,
            name: None,
            source,
            format: None,
            width: None,
            height: None,
            depth: None,
            document: None,
        }
    }
}

document_aware!(Image);
impl_element!(Image);

entity_builder! {
    /// Builder for [`Image`].
    ImageBuilder => Image {
        required { source: Uri }
        optional {
            id: String,
            name: String,
            format: String,
            width: u32,
            height: u32,
            depth: u32,
        }
        collections {}
        construct: Image::new,
    }
}
