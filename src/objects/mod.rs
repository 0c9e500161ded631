//! COLLADA object types.
//!
//! This module contains the in-memory model built by the parser:
//!
//! - [`Document`] - The root aggregate owning every library
//! - [`Library`] - One `<library_*>` element of a given entity kind
//! - [`Image`], [`Material`], [`Effect`], [`Geometry`], [`Light`],
//!   [`Camera`], [`Animation`], [`VisualScene`] - Library entities
//! - [`Node`] - The recursive scene graph
//!
//! Every entity kind has a matching builder (e.g. [`ImageBuilder`]) that
//! collects fields while the element is open and validates them once.
//!
//! Ownership bookkeeping lives in [`OwnedList`], [`DocumentAware`] and
//! [`DocumentId`].

#[macro_use]
mod macros;

mod animation;
mod asset;
mod camera;
mod common;
mod document;
mod effect;
mod geometry;
mod image;
mod light;
mod ownership;
mod scene;

// Re-export ownership model
pub use ownership::{DocumentAware, DocumentId, Element, OwnedList};
pub(crate) use ownership::{edit_attached, replace_attached, Seal};

// Re-export common types
pub use common::{Color, FilterMode, Uri, WrapMode, XMLNS_COLLADA_14, XMLNS_COLLADA_15};
pub(crate) use geometry::input_stride;

// Re-export main object types
pub use animation::{
    Animation, AnimationBuilder, AnimationSampler, AnimationSamplerBuilder, Channel,
    ChannelBuilder,
};
pub use asset::{
    parse_timestamp, Asset, AssetBuilder, Contributor, ContributorBuilder, Unit, UpAxis,
};
pub use camera::{
    Camera, CameraBuilder, Orthographic, OrthographicBuilder, Perspective, PerspectiveBuilder,
    Projection,
};
pub use document::{Document, Library, LibraryItem};
pub use effect::{
    ColorOrTexture, ColorSlot, Effect, EffectBuilder, FloatOrParam, FloatSlot, Material,
    MaterialBuilder, NewParam, NewParamBuilder, ParamValue, Sampler2D, Sampler2DBuilder, Shader,
    ShaderBuilder, ShadingModel, Surface, SurfaceBuilder, Texture, TextureBuilder,
};
pub use geometry::{
    Accessor, AccessorBuilder, ArrayData, FloatArray, Geometry, GeometryBuilder, Input,
    InputBuilder, Mesh, MeshBuilder, NameArray, Param, ParamBuilder, PolyList, PolyListBuilder,
    Polygons, PolygonsBuilder, Primitive, Source, SourceBuilder, Triangles, TrianglesBuilder,
    Vertices, VerticesBuilder,
};
pub use image::{Image, ImageBuilder};
pub use light::{Light, LightBuilder, LightType};
pub use scene::{
    BindVertexInput, BindVertexInputBuilder, Descendants, Instance, InstanceBuilder,
    InstanceGeometry, InstanceGeometryBuilder, InstanceMaterial, InstanceMaterialBuilder, Node,
    NodeBuilder, NodeType, Scene, SceneBuilder, Transform, TransformKind, VisualScene,
    VisualSceneBuilder,
};
