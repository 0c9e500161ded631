//! Parser frames: one per tracked open element.
//!
//! A [`Mode`] owns exactly the builder or collector relevant to the element
//! it was pushed for. When the element closes, [`Mode::finish`] validates
//! that state and yields a [`Built`] value for the parent frame.

use crate::decode::{ArrayWriter, ChunkDecoder};
use crate::error::Result;
use crate::objects::{
    Accessor, AccessorBuilder, Animation, AnimationBuilder, AnimationSampler,
    AnimationSamplerBuilder, ArrayData, Asset, AssetBuilder, Camera, CameraBuilder, ColorOrTexture,
    ColorSlot, Contributor, ContributorBuilder, Document, Effect, EffectBuilder, FloatArray,
    FloatOrParam, FloatSlot, Geometry, GeometryBuilder, Image, ImageBuilder, InstanceGeometry,
    InstanceGeometryBuilder, InstanceMaterial, InstanceMaterialBuilder, Library, LibraryItem,
    Light, LightBuilder, Material, MaterialBuilder, Mesh, MeshBuilder, NameArray, NewParam,
    NewParamBuilder, Node, NodeBuilder, OrthographicBuilder, ParamValue, PerspectiveBuilder,
    PolyListBuilder, PolygonsBuilder, Primitive, Projection, Sampler2DBuilder, Scene,
    SceneBuilder, Shader, ShaderBuilder, Source, SourceBuilder, SurfaceBuilder, Transform,
    TransformKind, TrianglesBuilder, Vertices, VerticesBuilder, VisualScene, VisualSceneBuilder,
};
use crate::objects::DocumentAware;
use crate::parser::Attributes;
use log::{debug, warn};

/// Upper bound on the values allocated up front from a `count` attribute.
const MAX_PREALLOC: usize = 1 << 20;

/// One entry of the parser stack.
#[derive(Debug)]
pub(crate) struct Frame {
    pub tag: String,
    pub mode: Mode,
}

/// Incremental decoding of a whitespace-separated list into an array.
pub(crate) struct ListFrame<T> {
    decoder: ChunkDecoder<T>,
    writer: ArrayWriter<T>,
    declared: Option<usize>,
}

impl<T> std::fmt::Debug for ListFrame<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListFrame")
            .field("decoder", &self.decoder)
            .field("declared", &self.declared)
            .finish()
    }
}

impl<T: Default + Clone> ListFrame<T> {
    /// Creates a collector expecting `declared` values, if known.
    pub fn new(decoder: ChunkDecoder<T>, declared: Option<usize>) -> Self {
        Self {
            decoder,
            writer: ArrayWriter::with_len(declared.map_or(0, |n| n.min(MAX_PREALLOC))),
            declared,
        }
    }

    pub fn add_text(&mut self, chunk: &str) -> Result<()> {
        let Self {
            decoder, writer, ..
        } = self;
        decoder.add_chunk(chunk, |v| writer.write(v))
    }

    /// Flushes the trailing token and returns the decoded values.
    pub fn finish(mut self, element: &str) -> Result<Vec<T>> {
        let Self {
            decoder, writer, ..
        } = &mut self;
        decoder.finish(|v| writer.write(v))?;
        if let Some(declared) = self.declared {
            if self.writer.written() < declared {
                warn!(
                    "<{}> declares {} values but holds {}",
                    element,
                    declared,
                    self.writer.written()
                );
            }
        }
        Ok(self.writer.into_values())
    }
}

/// A library under construction.
#[derive(Debug)]
pub(crate) enum LibraryFrame {
    Images(Library<Image>),
    Materials(Library<Material>),
    Effects(Library<Effect>),
    Geometries(Library<Geometry>),
    Lights(Library<Light>),
    Cameras(Library<Camera>),
    Animations(Library<Animation>),
    VisualScenes(Library<VisualScene>),
}

fn library<T: DocumentAware>(attrs: &Attributes) -> Library<T> {
    let mut library = Library::new();
    library.id = attrs.string("id");
    library.name = attrs.string("name");
    library
}

impl LibraryFrame {
    /// Starts the library opened by `tag`, if it is one.
    pub fn open(tag: &str, attrs: &Attributes) -> Option<Self> {
        let frame = match tag {
            t if t == Image::LIBRARY_TAG => LibraryFrame::Images(library(attrs)),
            t if t == Material::LIBRARY_TAG => LibraryFrame::Materials(library(attrs)),
            t if t == Effect::LIBRARY_TAG => LibraryFrame::Effects(library(attrs)),
            t if t == Geometry::LIBRARY_TAG => LibraryFrame::Geometries(library(attrs)),
            t if t == Light::LIBRARY_TAG => LibraryFrame::Lights(library(attrs)),
            t if t == Camera::LIBRARY_TAG => LibraryFrame::Cameras(library(attrs)),
            t if t == Animation::LIBRARY_TAG => LibraryFrame::Animations(library(attrs)),
            t if t == VisualScene::LIBRARY_TAG => LibraryFrame::VisualScenes(library(attrs)),
            _ => return None,
        };
        Some(frame)
    }

    /// Appends the finished library to the document.
    pub fn attach_to(self, document: &mut Document) {
        match self {
            LibraryFrame::Images(l) => document.add_library(l),
            LibraryFrame::Materials(l) => document.add_library(l),
            LibraryFrame::Effects(l) => document.add_library(l),
            LibraryFrame::Geometries(l) => document.add_library(l),
            LibraryFrame::Lights(l) => document.add_library(l),
            LibraryFrame::Cameras(l) => document.add_library(l),
            LibraryFrame::Animations(l) => document.add_library(l),
            LibraryFrame::VisualScenes(l) => document.add_library(l),
        }
    }
}

/// What a tracked element is building.
#[derive(Debug)]
pub(crate) enum Mode {
    /// The `<COLLADA>` root; owns the document under construction
    Collada(Document),
    /// Scoping element whose children belong to the nearest non-group frame
    Group,
    /// Attribute-only element, already applied when it opened
    Marker,
    /// Leaf value text
    Leaf(String),
    /// `<init_from>` text, either direct or from a nested `<ref>`
    InitFrom(String),
    Asset(AssetBuilder),
    Contributor(ContributorBuilder),
    Library(LibraryFrame),
    Image(ImageBuilder),
    Material(MaterialBuilder),
    Effect(EffectBuilder),
    NewParam(NewParamBuilder),
    /// `<float2>` to `<float4>` under a newparam
    FloatVector(ListFrame<f32>),
    Surface(SurfaceBuilder),
    Sampler2D(Sampler2DBuilder),
    Shader(ShaderBuilder),
    ColorSlot {
        slot: ColorSlot,
        value: Option<ColorOrTexture>,
    },
    FloatSlot {
        slot: FloatSlot,
        value: Option<FloatOrParam>,
    },
    Geometry(GeometryBuilder),
    Mesh(MeshBuilder),
    Source(SourceBuilder),
    FloatArray {
        array: FloatArray,
        list: ListFrame<f32>,
    },
    NameArray {
        array: NameArray,
        idref: bool,
        list: ListFrame<String>,
    },
    Accessor(AccessorBuilder),
    Vertices(VerticesBuilder),
    Triangles(TrianglesBuilder),
    Polygons(PolygonsBuilder),
    PolyList(PolyListBuilder),
    /// `<p>` or `<vcount>`
    Indices(ListFrame<u32>),
    Light(LightBuilder),
    Camera(CameraBuilder),
    Perspective(PerspectiveBuilder),
    Orthographic(OrthographicBuilder),
    Animation(AnimationBuilder),
    AnimationSampler(AnimationSamplerBuilder),
    VisualScene(VisualSceneBuilder),
    Node(NodeBuilder),
    Transform {
        kind: TransformKind,
        sid: Option<String>,
        list: ListFrame<f32>,
    },
    InstanceGeometry(InstanceGeometryBuilder),
    InstanceMaterial(InstanceMaterialBuilder),
    Scene(SceneBuilder),
}

/// The value a closed frame hands to its parent.
#[derive(Debug)]
pub(crate) enum Built {
    Document(Document),
    Leaf(String),
    Asset(Asset),
    Contributor(Contributor),
    Library(LibraryFrame),
    Image(Image),
    Material(Material),
    Effect(Effect),
    NewParam(NewParam),
    ParamValue(ParamValue),
    Shader(Shader),
    Color(ColorSlot, ColorOrTexture),
    Float(FloatSlot, FloatOrParam),
    Geometry(Geometry),
    Mesh(Mesh),
    Source(Source),
    Array(ArrayData),
    Accessor(Accessor),
    Vertices(Vertices),
    Primitive(Primitive),
    Indices(Vec<u32>),
    Light(Light),
    Camera(Camera),
    Projection(Projection),
    Animation(Animation),
    AnimationSampler(AnimationSampler),
    VisualScene(VisualScene),
    Node(Node),
    Transform(Transform),
    InstanceGeometry(InstanceGeometry),
    InstanceMaterial(InstanceMaterial),
    Scene(Scene),
}

impl Mode {
    /// Group frames are transparent when looking for a parent.
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Mode::Group)
    }

    /// Feeds a text fragment; modes without text content ignore it.
    pub fn add_text(&mut self, text: &str) -> Result<()> {
        match self {
            Mode::Leaf(buf) | Mode::InitFrom(buf) => buf.push_str(text),
            Mode::FloatArray { list, .. }
            | Mode::Transform { list, .. }
            | Mode::FloatVector(list) => list.add_text(text)?,
            Mode::NameArray { list, .. } => list.add_text(text)?,
            Mode::Indices(list) => list.add_text(text)?,
            _ => {}
        }
        Ok(())
    }

    /// Short name used in log and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Collada(_) => "COLLADA",
            Mode::Group => "group",
            Mode::Marker => "marker",
            Mode::Leaf(_) => "leaf",
            Mode::InitFrom(_) => "init_from",
            Mode::Asset(_) => "asset",
            Mode::Contributor(_) => "contributor",
            Mode::Library(_) => "library",
            Mode::Image(_) => "image",
            Mode::Material(_) => "material",
            Mode::Effect(_) => "effect",
            Mode::NewParam(_) => "newparam",
            Mode::FloatVector(_) => "float vector",
            Mode::Surface(_) => "surface",
            Mode::Sampler2D(_) => "sampler2D",
            Mode::Shader(_) => "shader",
            Mode::ColorSlot { .. } => "color slot",
            Mode::FloatSlot { .. } => "float slot",
            Mode::Geometry(_) => "geometry",
            Mode::Mesh(_) => "mesh",
            Mode::Source(_) => "source",
            Mode::FloatArray { .. } => "float_array",
            Mode::NameArray { .. } => "name array",
            Mode::Accessor(_) => "accessor",
            Mode::Vertices(_) => "vertices",
            Mode::Triangles(_) => "triangles",
            Mode::Polygons(_) => "polygons",
            Mode::PolyList(_) => "polylist",
            Mode::Indices(_) => "index list",
            Mode::Light(_) => "light",
            Mode::Camera(_) => "camera",
            Mode::Perspective(_) => "perspective",
            Mode::Orthographic(_) => "orthographic",
            Mode::Animation(_) => "animation",
            Mode::AnimationSampler(_) => "sampler",
            Mode::VisualScene(_) => "visual_scene",
            Mode::Node(_) => "node",
            Mode::Transform { .. } => "transform",
            Mode::InstanceGeometry(_) => "instance_geometry",
            Mode::InstanceMaterial(_) => "instance_material",
            Mode::Scene(_) => "scene",
        }
    }

    /// Validates and constructs whatever this frame collected.
    ///
    /// Returns `None` for frames that produce nothing of their own.
    pub fn finish(self, tag: &str) -> Result<Option<Built>> {
        let built = match self {
            Mode::Group | Mode::Marker => return Ok(None),
            Mode::ColorSlot { slot, value } => return Ok(value.map(|v| Built::Color(slot, v))),
            Mode::FloatSlot { slot, value } => return Ok(value.map(|v| Built::Float(slot, v))),
            Mode::Collada(document) => Built::Document(document),
            Mode::Leaf(text) | Mode::InitFrom(text) => Built::Leaf(text),
            Mode::Asset(b) => Built::Asset(b.into_entity()?),
            Mode::Contributor(b) => Built::Contributor(b.into_entity()?),
            Mode::Library(library) => Built::Library(library),
            Mode::Image(b) => Built::Image(b.into_entity()?),
            Mode::Material(b) => Built::Material(b.into_entity()?),
            Mode::Effect(b) => Built::Effect(b.into_entity()?),
            Mode::NewParam(b) if b.value.is_none() => {
                debug!("dropping <newparam> {:?} with no supported value", b.sid);
                return Ok(None);
            }
            Mode::NewParam(b) => Built::NewParam(b.into_entity()?),
            Mode::FloatVector(list) => Built::ParamValue(ParamValue::Floats(list.finish(tag)?)),
            Mode::Surface(b) => Built::ParamValue(ParamValue::Surface(b.into_entity()?)),
            Mode::Sampler2D(b) => Built::ParamValue(ParamValue::Sampler2D(b.into_entity()?)),
            Mode::Shader(b) => Built::Shader(b.into_entity()?),
            Mode::Geometry(b) => Built::Geometry(b.into_entity()?),
            Mode::Mesh(b) => Built::Mesh(b.into_entity()?),
            Mode::Source(b) => Built::Source(b.into_entity()?),
            Mode::FloatArray { mut array, list } => {
                array.values = list.finish(tag)?;
                Built::Array(ArrayData::Float(array))
            }
            Mode::NameArray {
                mut array,
                idref,
                list,
            } => {
                array.values = list.finish(tag)?;
                if idref {
                    Built::Array(ArrayData::IdRef(array))
                } else {
                    Built::Array(ArrayData::Name(array))
                }
            }
            Mode::Accessor(b) => Built::Accessor(b.into_entity()?),
            Mode::Vertices(b) => Built::Vertices(b.into_entity()?),
            Mode::Triangles(b) => Built::Primitive(Primitive::Triangles(b.into_entity()?)),
            Mode::Polygons(b) => Built::Primitive(Primitive::Polygons(b.into_entity()?)),
            Mode::PolyList(b) => Built::Primitive(Primitive::PolyList(b.into_entity()?)),
            Mode::Indices(list) => Built::Indices(list.finish(tag)?),
            Mode::Light(b) => Built::Light(b.into_entity()?),
            Mode::Camera(b) => Built::Camera(b.into_entity()?),
            Mode::Perspective(b) => Built::Projection(Projection::Perspective(b.into_entity()?)),
            Mode::Orthographic(b) => {
                Built::Projection(Projection::Orthographic(b.into_entity()?))
            }
            Mode::Animation(b) => Built::Animation(b.into_entity()?),
            Mode::AnimationSampler(b) => Built::AnimationSampler(b.into_entity()?),
            Mode::VisualScene(b) => Built::VisualScene(b.into_entity()?),
            Mode::Node(b) => Built::Node(b.into_entity()?),
            Mode::Transform { kind, sid, list } => {
                let mut transform = Transform::new(kind, list.finish(tag)?)?;
                transform.sid = sid;
                Built::Transform(transform)
            }
            Mode::InstanceGeometry(b) => Built::InstanceGeometry(b.into_entity()?),
            Mode::InstanceMaterial(b) => Built::InstanceMaterial(b.into_entity()?),
            Mode::Scene(b) => Built::Scene(b.into_entity()?),
        };
        Ok(Some(built))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{FloatDecoder, IntDecoder};

    #[test]
    fn test_list_frame_shortfall_truncates() {
        let mut list = ListFrame::new(FloatDecoder::floats(), Some(4));
        list.add_text("1 2").unwrap();
        list.add_text(" 3").unwrap();
        assert_eq!(list.finish("float_array").unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_list_frame_surplus_grows() {
        let mut list = ListFrame::new(IntDecoder::integers(), Some(1));
        list.add_text("7 8 9").unwrap();
        assert_eq!(list.finish("p").unwrap(), vec![7, 8, 9]);
    }

    #[test]
    fn test_empty_slot_builds_nothing() {
        let mode = Mode::ColorSlot {
            slot: ColorSlot::Diffuse,
            value: None,
        };
        assert!(mode.finish("diffuse").unwrap().is_none());
    }

    #[test]
    fn test_newparam_without_value_is_dropped() {
        let mut b = NewParamBuilder::new();
        b.sid = Some("unsupported".to_string());
        assert!(Mode::NewParam(b).finish("newparam").unwrap().is_none());
    }

    #[test]
    fn test_float_vector_value() {
        let mut mode = Mode::FloatVector(ListFrame::new(FloatDecoder::floats(), Some(3)));
        mode.add_text("1 0.").unwrap();
        mode.add_text("5 0").unwrap();
        assert!(matches!(
            mode.finish("float3").unwrap(),
            Some(Built::ParamValue(ParamValue::Floats(ref v))) if v == &[1.0, 0.5, 0.0]
        ));
    }

    #[test]
    fn test_transform_checks_arity() {
        let mut mode = Mode::Transform {
            kind: TransformKind::Rotate,
            sid: Some("rotX".to_string()),
            list: ListFrame::new(FloatDecoder::floats(), None),
        };
        mode.add_text("1 0 0").unwrap();
        assert!(mode.finish("rotate").is_err());
    }

    #[test]
    fn test_library_tags() {
        let attrs: Attributes = [("id", "lib")].into_iter().collect();
        assert!(matches!(
            LibraryFrame::open("library_lights", &attrs),
            Some(LibraryFrame::Lights(ref l)) if l.id.as_deref() == Some("lib")
        ));
        assert!(LibraryFrame::open("library_controllers", &attrs).is_none());
    }
}
