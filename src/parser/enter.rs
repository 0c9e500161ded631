//! Element-opened transitions.
//!
//! [`enter`] maps `(target mode, tag)` to the frame pushed for the new
//! element. The target is the nearest non-group frame, so scoping elements
//! such as `technique_common` never change which entity a child belongs
//! to. Pairs with no transition return `None` and the element's subtree is
//! skipped.

use crate::decode::{FloatDecoder, IntDecoder, StringDecoder};
use crate::error::{Error, Result};
use crate::objects::{
    input_stride, AccessorBuilder, AnimationBuilder, AnimationSamplerBuilder, AssetBuilder,
    BindVertexInputBuilder, CameraBuilder, ChannelBuilder, ColorOrTexture, ColorSlot,
    ContributorBuilder, Document, EffectBuilder, FloatArray, FloatOrParam, FloatSlot,
    GeometryBuilder, ImageBuilder, Input, InputBuilder, Instance, InstanceBuilder,
    InstanceGeometryBuilder, InstanceMaterialBuilder, LightBuilder, MaterialBuilder, MeshBuilder,
    NameArray, NewParamBuilder, NodeBuilder, OrthographicBuilder, ParamBuilder,
    PerspectiveBuilder, PolyListBuilder, PolygonsBuilder, Sampler2DBuilder, SceneBuilder,
    ShaderBuilder, ShadingModel, SourceBuilder, SurfaceBuilder, TextureBuilder, TransformKind,
    TrianglesBuilder, Unit, VerticesBuilder, VisualSceneBuilder,
};
use crate::parser::frame::{LibraryFrame, ListFrame, Mode};
use crate::parser::Attributes;

/// Returns the mode for an element opened under `target`, or `None` to
/// skip it. `target` is `None` at the document root.
pub(crate) fn enter(target: Option<&mut Mode>, tag: &str, attrs: &Attributes) -> Result<Option<Mode>> {
    let target = match target {
        Some(target) => target,
        None if tag == "COLLADA" => {
            let mut document = Document::new();
            document.version = attrs.string("version");
            return Ok(Some(Mode::Collada(document)));
        }
        None => return Ok(None),
    };

    let mode = match (target, tag) {
        // document level
        (Mode::Collada(_), "asset") => Mode::Asset(AssetBuilder::new()),
        (Mode::Collada(_), "scene") => Mode::Scene(SceneBuilder::new()),
        (Mode::Collada(_), _) => match LibraryFrame::open(tag, attrs) {
            Some(library) => Mode::Library(library),
            None => return Ok(None),
        },
        (Mode::Scene(b), "instance_visual_scene") => {
            b.visual_scene = Some(instance(attrs)?);
            Mode::Marker
        }

        // asset
        (Mode::Asset(_), "contributor") => Mode::Contributor(ContributorBuilder::new()),
        (
            Mode::Asset(_),
            "created" | "modified" | "title" | "subject" | "keywords" | "revision" | "up_axis",
        ) => leaf(),
        (Mode::Asset(b), "unit") => {
            b.unit = Some(Unit {
                name: attrs.string("name"),
                meter: attrs.f64("meter")?.unwrap_or(1.0),
            });
            Mode::Marker
        }
        (Mode::Contributor(_), "author" | "authoring_tool" | "comments" | "copyright") => leaf(),

        // library entries
        (Mode::Library(library), _) => match open_entry(library, tag, attrs)? {
            Some(mode) => mode,
            None => return Ok(None),
        },

        // images
        (Mode::Image(_), "init_from") => Mode::InitFrom(String::new()),
        (Mode::InitFrom(_), "ref") => leaf(),

        // materials
        (Mode::Material(b), "instance_effect") => {
            b.instance_effect = attrs.uri("url")?;
            Mode::Marker
        }

        // effects
        (Mode::Effect(_), "profile_COMMON") => Mode::Group,
        (Mode::Effect(b), "technique") => {
            b.technique_sid = attrs.string("sid");
            Mode::Group
        }
        (Mode::Effect(_), "newparam") => {
            let mut b = NewParamBuilder::new();
            b.sid = attrs.string("sid");
            Mode::NewParam(b)
        }
        (Mode::Effect(_), "constant" | "lambert" | "phong" | "blinn") => {
            let mut b = ShaderBuilder::new();
            b.model = Some(tag.parse::<ShadingModel>()?);
            Mode::Shader(b)
        }
        (Mode::NewParam(_), "surface") => {
            let mut b = SurfaceBuilder::new();
            b.surface_type = attrs.string("type");
            Mode::Surface(b)
        }
        (Mode::NewParam(_), "sampler2D") => Mode::Sampler2D(Sampler2DBuilder::new()),
        (Mode::NewParam(_), "float") => leaf(),
        (Mode::NewParam(_), "float2" | "float3" | "float4") => {
            let arity = tag[5..].parse::<usize>().ok();
            Mode::FloatVector(ListFrame::new(FloatDecoder::floats(), arity))
        }
        (Mode::Surface(_), "init_from") => Mode::InitFrom(String::new()),
        (Mode::Surface(_), "format") => leaf(),
        (
            Mode::Sampler2D(_),
            "source" | "wrap_s" | "wrap_t" | "minfilter" | "magfilter" | "mipfilter",
        ) => leaf(),
        (Mode::Shader(_), _) => {
            if let Some(slot) = ColorSlot::from_tag(tag) {
                Mode::ColorSlot { slot, value: None }
            } else if let Some(slot) = FloatSlot::from_tag(tag) {
                Mode::FloatSlot { slot, value: None }
            } else {
                return Ok(None);
            }
        }
        (Mode::ColorSlot { .. }, "color") => leaf(),
        (Mode::ColorSlot { value, .. }, "texture") => {
            let mut b = TextureBuilder::new();
            b.texture = attrs.string("texture");
            b.texcoord = attrs.string("texcoord");
            *value = Some(ColorOrTexture::Texture(b.into_entity()?));
            Mode::Marker
        }
        (Mode::ColorSlot { value, .. }, "param") => {
            *value = Some(ColorOrTexture::Param(param_ref(attrs)?));
            Mode::Marker
        }
        (Mode::FloatSlot { .. }, "float") => leaf(),
        (Mode::FloatSlot { value, .. }, "param") => {
            *value = Some(FloatOrParam::Param(param_ref(attrs)?));
            Mode::Marker
        }

        // geometry
        (Mode::Geometry(_), "mesh") => Mode::Mesh(MeshBuilder::new()),
        (Mode::Mesh(_) | Mode::Animation(_), "source") => {
            let mut b = SourceBuilder::new();
            b.id = attrs.string("id");
            b.name = attrs.string("name");
            Mode::Source(b)
        }
        (Mode::Mesh(_), "vertices") => {
            let mut b = VerticesBuilder::new();
            b.id = attrs.string("id");
            b.name = attrs.string("name");
            Mode::Vertices(b)
        }
        (Mode::Mesh(_), "triangles") => {
            let mut b = TrianglesBuilder::new();
            b.count = attrs.u32("count")?;
            b.material = attrs.string("material");
            b.name = attrs.string("name");
            Mode::Triangles(b)
        }
        (Mode::Mesh(_), "polygons") => {
            let mut b = PolygonsBuilder::new();
            b.count = attrs.u32("count")?;
            b.material = attrs.string("material");
            b.name = attrs.string("name");
            Mode::Polygons(b)
        }
        (Mode::Mesh(_), "polylist") => {
            let mut b = PolyListBuilder::new();
            b.count = attrs.u32("count")?;
            b.material = attrs.string("material");
            b.name = attrs.string("name");
            Mode::PolyList(b)
        }
        (Mode::Source(_), "float_array") => {
            let mut array = FloatArray::default();
            array.id = attrs.string("id");
            array.name = attrs.string("name");
            let list = ListFrame::new(FloatDecoder::floats(), count(attrs)?);
            Mode::FloatArray { array, list }
        }
        (Mode::Source(_), "Name_array" | "IDREF_array") => {
            let mut array = NameArray::default();
            array.id = attrs.string("id");
            array.name = attrs.string("name");
            let list = ListFrame::new(StringDecoder::strings(), count(attrs)?);
            Mode::NameArray {
                array,
                idref: tag == "IDREF_array",
                list,
            }
        }
        (Mode::Source(_), "technique_common") => Mode::Group,
        (Mode::Source(_), "accessor") => {
            let mut b = AccessorBuilder::new();
            b.source = attrs.uri("source")?;
            b.count = attrs.u32("count")?;
            b.stride = attrs.u32("stride")?;
            b.offset = attrs.u32("offset")?;
            Mode::Accessor(b)
        }
        (Mode::Accessor(b), "param") => {
            let mut param = ParamBuilder::new();
            param.name = attrs.string("name");
            param.sid = attrs.string("sid");
            param.param_type = attrs.string("type");
            param.semantic = attrs.string("semantic");
            b.params.push(param.into_entity()?);
            Mode::Marker
        }
        (Mode::Vertices(b), "input") => {
            b.inputs.push(input(attrs)?);
            Mode::Marker
        }
        (Mode::Triangles(b), "input") => {
            b.inputs.push(input(attrs)?);
            Mode::Marker
        }
        (Mode::Polygons(b), "input") => {
            b.inputs.push(input(attrs)?);
            Mode::Marker
        }
        (Mode::PolyList(b), "input") => {
            b.inputs.push(input(attrs)?);
            Mode::Marker
        }
        (Mode::Triangles(b), "p") => {
            let expected = b.count.map(|n| n as usize * 3 * input_stride(&b.inputs));
            Mode::Indices(ListFrame::new(IntDecoder::integers(), expected))
        }
        (Mode::Polygons(_), "p") => Mode::Indices(ListFrame::new(IntDecoder::integers(), None)),
        (Mode::PolyList(b), "vcount") => {
            let expected = b.count.map(|n| n as usize);
            Mode::Indices(ListFrame::new(IntDecoder::integers(), expected))
        }
        (Mode::PolyList(b), "p") => {
            let vertices: usize = b.vcount.iter().map(|&n| n as usize).sum();
            let expected = (!b.vcount.is_empty()).then(|| vertices * input_stride(&b.inputs));
            Mode::Indices(ListFrame::new(IntDecoder::integers(), expected))
        }

        // lights
        (Mode::Light(_), "technique_common") => Mode::Group,
        (Mode::Light(b), "ambient" | "directional" | "point" | "spot") => {
            b.light_type = Some(tag.parse()?);
            Mode::Group
        }
        (
            Mode::Light(_),
            "color"
            | "constant_attenuation"
            | "linear_attenuation"
            | "quadratic_attenuation"
            | "falloff_angle"
            | "falloff_exponent",
        ) => leaf(),

        // cameras
        (Mode::Camera(_), "optics" | "technique_common") => Mode::Group,
        (Mode::Camera(_), "perspective") => Mode::Perspective(PerspectiveBuilder::new()),
        (Mode::Camera(_), "orthographic") => Mode::Orthographic(OrthographicBuilder::new()),
        (Mode::Perspective(_), "xfov" | "yfov" | "aspect_ratio" | "znear" | "zfar") => leaf(),
        (Mode::Orthographic(_), "xmag" | "ymag" | "aspect_ratio" | "znear" | "zfar") => leaf(),

        // animations
        (Mode::Animation(_), "animation") => Mode::Animation(animation(attrs)),
        (Mode::Animation(_), "sampler") => {
            let mut b = AnimationSamplerBuilder::new();
            b.id = attrs.string("id");
            Mode::AnimationSampler(b)
        }
        (Mode::AnimationSampler(b), "input") => {
            b.inputs.push(input(attrs)?);
            Mode::Marker
        }
        (Mode::Animation(b), "channel") => {
            let mut channel = ChannelBuilder::new();
            channel.source = attrs.uri("source")?;
            channel.target = attrs.string("target");
            b.channels.push(channel.into_entity()?);
            Mode::Marker
        }

        // visual scenes
        (Mode::VisualScene(_) | Mode::Node(_), "node") => {
            let mut b = NodeBuilder::new();
            b.id = attrs.string("id");
            b.sid = attrs.string("sid");
            b.name = attrs.string("name");
            b.node_type = attrs.parse("type")?;
            Mode::Node(b)
        }
        (Mode::Node(_), "matrix" | "translate" | "rotate" | "scale" | "lookat" | "skew") => {
            Mode::Transform {
                kind: tag.parse::<TransformKind>()?,
                sid: attrs.string("sid"),
                list: ListFrame::new(FloatDecoder::floats(), None),
            }
        }
        (Mode::Node(_), "instance_geometry") => {
            let mut b = InstanceGeometryBuilder::new();
            b.url = attrs.uri("url")?;
            b.sid = attrs.string("sid");
            b.name = attrs.string("name");
            Mode::InstanceGeometry(b)
        }
        (Mode::Node(b), "instance_light") => {
            b.instance_lights.push(instance(attrs)?);
            Mode::Marker
        }
        (Mode::Node(b), "instance_camera") => {
            b.instance_cameras.push(instance(attrs)?);
            Mode::Marker
        }
        (Mode::Node(b), "instance_node") => {
            b.instance_nodes.push(instance(attrs)?);
            Mode::Marker
        }
        (Mode::InstanceGeometry(_), "bind_material" | "technique_common") => Mode::Group,
        (Mode::InstanceGeometry(_), "instance_material") => {
            let mut b = InstanceMaterialBuilder::new();
            b.symbol = attrs.string("symbol");
            b.target = attrs.uri("target")?;
            b.sid = attrs.string("sid");
            b.name = attrs.string("name");
            Mode::InstanceMaterial(b)
        }
        (Mode::InstanceMaterial(b), "bind_vertex_input") => {
            let mut binding = BindVertexInputBuilder::new();
            binding.semantic = attrs.string("semantic");
            binding.input_semantic = attrs.string("input_semantic");
            binding.input_set = attrs.u32("input_set")?;
            b.vertex_inputs.push(binding.into_entity()?);
            Mode::Marker
        }

        _ => return Ok(None),
    };
    Ok(Some(mode))
}

/// Opens an entity inside a library, if `tag` is the library's entry tag.
fn open_entry(library: &LibraryFrame, tag: &str, attrs: &Attributes) -> Result<Option<Mode>> {
    let mode = match (library, tag) {
        (LibraryFrame::Images(_), "image") => {
            let mut b = ImageBuilder::new();
            b.id = attrs.string("id");
            b.name = attrs.string("name");
            b.format = attrs.string("format");
            b.width = attrs.u32("width")?;
            b.height = attrs.u32("height")?;
            b.depth = attrs.u32("depth")?;
            Mode::Image(b)
        }
        (LibraryFrame::Materials(_), "material") => {
            let mut b = MaterialBuilder::new();
            b.id = attrs.string("id");
            b.name = attrs.string("name");
            Mode::Material(b)
        }
        (LibraryFrame::Effects(_), "effect") => {
            let mut b = EffectBuilder::new();
            b.id = attrs.string("id");
            b.name = attrs.string("name");
            Mode::Effect(b)
        }
        (LibraryFrame::Geometries(_), "geometry") => {
            let mut b = GeometryBuilder::new();
            b.id = attrs.string("id");
            b.name = attrs.string("name");
            Mode::Geometry(b)
        }
        (LibraryFrame::Lights(_), "light") => {
            let mut b = LightBuilder::new();
            b.id = attrs.string("id");
            b.name = attrs.string("name");
            Mode::Light(b)
        }
        (LibraryFrame::Cameras(_), "camera") => {
            let mut b = CameraBuilder::new();
            b.id = attrs.string("id");
            b.name = attrs.string("name");
            Mode::Camera(b)
        }
        (LibraryFrame::Animations(_), "animation") => Mode::Animation(animation(attrs)),
        (LibraryFrame::VisualScenes(_), "visual_scene") => {
            let mut b = VisualSceneBuilder::new();
            b.id = attrs.string("id");
            b.name = attrs.string("name");
            Mode::VisualScene(b)
        }
        _ => return Ok(None),
    };
    Ok(Some(mode))
}

fn leaf() -> Mode {
    Mode::Leaf(String::new())
}

fn count(attrs: &Attributes) -> Result<Option<usize>> {
    Ok(attrs.u32("count")?.map(|n| n as usize))
}

fn animation(attrs: &Attributes) -> AnimationBuilder {
    let mut b = AnimationBuilder::new();
    b.id = attrs.string("id");
    b.name = attrs.string("name");
    b
}

fn input(attrs: &Attributes) -> Result<Input> {
    let mut b = InputBuilder::new();
    b.semantic = attrs.string("semantic");
    b.source = attrs.uri("source")?;
    b.offset = attrs.u32("offset")?;
    b.set = attrs.u32("set")?;
    b.into_entity()
}

fn instance(attrs: &Attributes) -> Result<Instance> {
    let mut b = InstanceBuilder::new();
    b.url = attrs.uri("url")?;
    b.sid = attrs.string("sid");
    b.name = attrs.string("name");
    b.into_entity()
}

fn param_ref(attrs: &Attributes) -> Result<String> {
    attrs.string("ref").ok_or(Error::MissingField {
        entity: "param",
        field: "ref",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Uri;

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_root_only_accepts_collada() {
        let root = enter(None, "COLLADA", &attrs(&[("version", "1.4.1")]))
            .unwrap()
            .unwrap();
        assert!(matches!(root, Mode::Collada(ref d) if d.version.as_deref() == Some("1.4.1")));
        assert!(enter(None, "X3D", &Attributes::new()).unwrap().is_none());
    }

    #[test]
    fn test_unknown_pairs_are_skipped() {
        let mut mode = Mode::Collada(Document::new());
        assert!(enter(Some(&mut mode), "library_controllers", &Attributes::new())
            .unwrap()
            .is_none());
        let mut mode = Mode::Marker;
        assert!(enter(Some(&mut mode), "extra", &Attributes::new())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_attribute_only_elements_apply_on_open() {
        let mut mode = Mode::Node(NodeBuilder::new());
        let next = enter(
            Some(&mut mode),
            "instance_light",
            &attrs(&[("url", "#light-1")]),
        )
        .unwrap();
        assert!(matches!(next, Some(Mode::Marker)));
        match mode {
            Mode::Node(b) => {
                assert_eq!(b.instance_lights[0].url, Uri::parse("#light-1").unwrap())
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_light_type_from_element() {
        let mut mode = Mode::Light(LightBuilder::new());
        let next = enter(Some(&mut mode), "spot", &Attributes::new()).unwrap();
        assert!(matches!(next, Some(Mode::Group)));
        assert!(matches!(mode, Mode::Light(ref b) if b.light_type.is_some()));
    }

    #[test]
    fn test_invalid_attribute_fails() {
        let mut mode = Mode::Mesh(MeshBuilder::new());
        assert!(matches!(
            enter(Some(&mut mode), "triangles", &attrs(&[("count", "two")])),
            Err(Error::InvalidInteger { .. })
        ));
    }

    #[test]
    fn test_ref_only_under_init_from() {
        let mut mode = Mode::Image(ImageBuilder::new());
        let mut init_from = enter(Some(&mut mode), "init_from", &Attributes::new())
            .unwrap()
            .unwrap();
        assert!(matches!(init_from, Mode::InitFrom(_)));
        assert!(matches!(
            enter(Some(&mut init_from), "ref", &Attributes::new()).unwrap(),
            Some(Mode::Leaf(_))
        ));

        let mut created = leaf();
        assert!(enter(Some(&mut created), "ref", &Attributes::new())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_newparam_vectors() {
        let mut mode = Mode::NewParam(NewParamBuilder::new());
        let next = enter(Some(&mut mode), "float3", &Attributes::new()).unwrap();
        assert!(matches!(next, Some(Mode::FloatVector(_))));
        assert!(enter(Some(&mut mode), "float7", &Attributes::new())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_param_requires_ref() {
        let mut mode = Mode::FloatSlot {
            slot: FloatSlot::Shininess,
            value: None,
        };
        assert!(matches!(
            enter(Some(&mut mode), "param", &Attributes::new()),
            Err(Error::MissingField { entity: "param", .. })
        ));
    }
}
