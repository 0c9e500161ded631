//! Element-closed routing: where a finished value goes.

use crate::decode::parse_f32;
use crate::error::{Error, Result};
use crate::objects::{parse_timestamp, ColorOrTexture, FloatOrParam, ParamValue, Uri};
use crate::parser::frame::{Built, LibraryFrame, Mode};

/// Moves a value built by a closed `<tag>` element into its parent frame.
pub(crate) fn attach(target: &mut Mode, tag: &str, built: Built) -> Result<()> {
    match (target, built) {
        (Mode::Collada(doc), Built::Asset(asset)) => {
            doc.set_asset(Some(asset));
        }
        (Mode::Collada(doc), Built::Scene(scene)) => {
            doc.set_scene(Some(scene));
        }
        (Mode::Collada(doc), Built::Library(library)) => library.attach_to(doc),
        (Mode::Asset(b), Built::Contributor(c)) => b.contributors.push(c),

        (Mode::Library(LibraryFrame::Images(l)), Built::Image(e)) => l.push(e),
        (Mode::Library(LibraryFrame::Materials(l)), Built::Material(e)) => l.push(e),
        (Mode::Library(LibraryFrame::Effects(l)), Built::Effect(e)) => l.push(e),
        (Mode::Library(LibraryFrame::Geometries(l)), Built::Geometry(e)) => l.push(e),
        (Mode::Library(LibraryFrame::Lights(l)), Built::Light(e)) => l.push(e),
        (Mode::Library(LibraryFrame::Cameras(l)), Built::Camera(e)) => l.push(e),
        (Mode::Library(LibraryFrame::Animations(l)), Built::Animation(e)) => l.push(e),
        (Mode::Library(LibraryFrame::VisualScenes(l)), Built::VisualScene(e)) => l.push(e),

        (Mode::Effect(b), Built::NewParam(p)) => b.params.push(p),
        (Mode::Effect(b), Built::Shader(s)) => b.shader = Some(s),
        (Mode::NewParam(b), Built::ParamValue(v)) => b.value = Some(v),
        (Mode::Shader(b), Built::Color(slot, v)) => b.set_color(slot, v),
        (Mode::Shader(b), Built::Float(slot, v)) => b.set_float(slot, v),

        (Mode::Geometry(b), Built::Mesh(m)) => b.mesh = Some(m),
        (Mode::Mesh(b), Built::Source(s)) => b.sources.push(s),
        (Mode::Mesh(b), Built::Vertices(v)) => b.vertices = Some(v),
        (Mode::Mesh(b), Built::Primitive(p)) => b.primitives.push(p),
        (Mode::Source(b), Built::Array(a)) => b.array = Some(a),
        (Mode::Source(b), Built::Accessor(a)) => b.accessor = Some(a),
        (Mode::Triangles(b), Built::Indices(v)) => b.indices.extend(v),
        (Mode::Polygons(b), Built::Indices(v)) => b.faces.push(v),
        (Mode::PolyList(b), Built::Indices(v)) if tag == "vcount" => b.vcount = v,
        (Mode::PolyList(b), Built::Indices(v)) => b.indices = v,

        (Mode::Camera(b), Built::Projection(p)) => b.projection = Some(p),

        (Mode::Animation(b), Built::Source(s)) => b.sources.push(s),
        (Mode::Animation(b), Built::AnimationSampler(s)) => b.samplers.push(s),
        (Mode::Animation(b), Built::Animation(a)) => b.children.push(a),

        (Mode::VisualScene(b), Built::Node(n)) => b.nodes.push(n),
        (Mode::Node(b), Built::Node(n)) => b.children.push(n),
        (Mode::Node(b), Built::Transform(t)) => b.transforms.push(t),
        (Mode::Node(b), Built::InstanceGeometry(g)) => b.instance_geometries.push(g),
        (Mode::InstanceGeometry(b), Built::InstanceMaterial(m)) => b.materials.push(m),

        (target, Built::Leaf(text)) => assign_leaf(target, tag, text.trim())?,
        (target, _) => {
            return Err(Error::Structural(format!(
                "<{}> cannot be placed inside {}",
                tag,
                target.name()
            )))
        }
    }
    Ok(())
}

/// Parses the trimmed text of a closed leaf element into the field of
/// `target` named by `tag`.
pub(crate) fn assign_leaf(target: &mut Mode, tag: &str, text: &str) -> Result<()> {
    let owned = || Some(text.to_string());
    match (target, tag) {
        // <init_from><ref>..</ref></init_from>
        (Mode::InitFrom(buf), "ref") => buf.push_str(text),

        (Mode::Asset(b), "created") => b.created = Some(parse_timestamp(text)?),
        (Mode::Asset(b), "modified") => b.modified = Some(parse_timestamp(text)?),
        (Mode::Asset(b), "title") => b.title = owned(),
        (Mode::Asset(b), "subject") => b.subject = owned(),
        (Mode::Asset(b), "keywords") => b.keywords = owned(),
        (Mode::Asset(b), "revision") => b.revision = owned(),
        (Mode::Asset(b), "up_axis") => b.up_axis = Some(text.parse()?),
        (Mode::Contributor(b), "author") => b.author = owned(),
        (Mode::Contributor(b), "authoring_tool") => b.authoring_tool = owned(),
        (Mode::Contributor(b), "comments") => b.comments = owned(),
        (Mode::Contributor(b), "copyright") => b.copyright = owned(),

        (Mode::Image(b), "init_from") => b.source = Some(Uri::parse(text)?),

        (Mode::NewParam(b), "float") => b.value = Some(ParamValue::Float(parse_f32(text)?)),
        (Mode::Surface(b), "init_from") => b.init_from = owned(),
        (Mode::Surface(b), "format") => b.format = owned(),
        (Mode::Sampler2D(b), "source") => b.source = owned(),
        (Mode::Sampler2D(b), "wrap_s") => b.wrap_s = Some(text.parse()?),
        (Mode::Sampler2D(b), "wrap_t") => b.wrap_t = Some(text.parse()?),
        (Mode::Sampler2D(b), "minfilter") => b.minfilter = Some(text.parse()?),
        (Mode::Sampler2D(b), "magfilter") => b.magfilter = Some(text.parse()?),
        (Mode::Sampler2D(b), "mipfilter") => b.mipfilter = Some(text.parse()?),
        (Mode::ColorSlot { value, .. }, "color") => {
            *value = Some(ColorOrTexture::Color(text.parse()?))
        }
        (Mode::FloatSlot { value, .. }, "float") => {
            *value = Some(FloatOrParam::Float(parse_f32(text)?))
        }

        (Mode::Light(b), "color") => b.color = Some(text.parse()?),
        (Mode::Light(b), "constant_attenuation") => b.constant_attenuation = Some(parse_f32(text)?),
        (Mode::Light(b), "linear_attenuation") => b.linear_attenuation = Some(parse_f32(text)?),
        (Mode::Light(b), "quadratic_attenuation") => {
            b.quadratic_attenuation = Some(parse_f32(text)?)
        }
        (Mode::Light(b), "falloff_angle") => b.falloff_angle = Some(parse_f32(text)?),
        (Mode::Light(b), "falloff_exponent") => b.falloff_exponent = Some(parse_f32(text)?),

        (Mode::Perspective(b), "xfov") => b.xfov = Some(parse_f32(text)?),
        (Mode::Perspective(b), "yfov") => b.yfov = Some(parse_f32(text)?),
        (Mode::Perspective(b), "aspect_ratio") => b.aspect_ratio = Some(parse_f32(text)?),
        (Mode::Perspective(b), "znear") => b.znear = Some(parse_f32(text)?),
        (Mode::Perspective(b), "zfar") => b.zfar = Some(parse_f32(text)?),
        (Mode::Orthographic(b), "xmag") => b.xmag = Some(parse_f32(text)?),
        (Mode::Orthographic(b), "ymag") => b.ymag = Some(parse_f32(text)?),
        (Mode::Orthographic(b), "aspect_ratio") => b.aspect_ratio = Some(parse_f32(text)?),
        (Mode::Orthographic(b), "znear") => b.znear = Some(parse_f32(text)?),
        (Mode::Orthographic(b), "zfar") => b.zfar = Some(parse_f32(text)?),

        (target, _) => {
            return Err(Error::Structural(format!(
                "no field for <{}> in {}",
                tag,
                target.name()
            )))
        }
    }
    Ok(())
}
