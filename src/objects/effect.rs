//! Materials and effects.
//!
//! A [`Material`] instantiates an [`Effect`]; the effect carries the
//! fixed-function shading description from `<profile_COMMON>`:
//! parameters (surfaces, samplers, floats and float vectors) and one
//! [`Shader`].

use crate::error::{Error, Result};
use crate::objects::common::{Color, FilterMode, Uri, WrapMode};
use crate::objects::ownership::{DocumentId, OwnedList};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Material
// ============================================================================

/// A material from `<library_materials>`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    /// Document-wide identifier
    pub id: Option<String>,
    /// Human-readable name
    pub name: Option<String>,
    /// The effect this material instantiates
    pub instance_effect: Uri,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl Material {
    /// Creates a material bound to an effect.
    pub fn new(instance_effect: Uri) -> Self {
        Self {
            id: None,
            name: None,
            instance_effect,
            document: None,
        }
    }
}

document_aware!(Material);
impl_element!(Material);

entity_builder! {
    /// Builder for [`Material`].
    MaterialBuilder => Material {
        required { instance_effect: Uri }
        optional { id: String, name: String }
        collections {}
        construct: Material::new,
    }
}

// ============================================================================
// Effect parameters
// ============================================================================

/// A `<surface>` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Surface {
    /// Surface type, e.g. "2D"
    pub surface_type: String,
    /// Image id the surface is initialised from
    pub init_from: Option<String>,
    /// Texel format hint
    pub format: Option<String>,
}

impl Surface {
    /// Creates a surface of the given type.
    pub fn new(surface_type: String) -> Self {
        Self {
            surface_type,
            init_from: None,
            format: None,
        }
    }
}

entity_builder! {
    /// Builder for [`Surface`].
    SurfaceBuilder => Surface {
        required { surface_type: String }
        optional { init_from: String, format: String }
        collections {}
        construct: Surface::new,
    }
}

/// A `<sampler2D>` parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sampler2D {
    /// Sid of the surface parameter being sampled
    pub source: Option<String>,
    /// Wrap mode along S
    pub wrap_s: Option<WrapMode>,
    /// Wrap mode along T
    pub wrap_t: Option<WrapMode>,
    /// Minification filter
    pub minfilter: Option<FilterMode>,
    /// Magnification filter
    pub magfilter: Option<FilterMode>,
    /// Mipmap filter
    pub mipfilter: Option<FilterMode>,
}

entity_builder! {
    /// Builder for [`Sampler2D`].
    Sampler2DBuilder => Sampler2D {
        required {}
        optional {
            source: String,
            wrap_s: WrapMode,
            wrap_t: WrapMode,
            minfilter: FilterMode,
            magfilter: FilterMode,
            mipfilter: FilterMode,
        }
        collections {}
        construct: Sampler2D::default,
    }
}

/// Value held by a `<newparam>`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParamValue {
    /// A surface
    Surface(Surface),
    /// A 2D sampler
    Sampler2D(Sampler2D),
    /// A scalar
    Float(f32),
    /// A `float2`, `float3` or `float4` vector
    Floats(Vec<f32>),
}

/// A `<newparam>` declared by an effect profile.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewParam {
    /// Scoped identifier other parameters refer to
    pub sid: String,
    /// The parameter value
    pub value: ParamValue,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl NewParam {
    /// Creates a parameter.
    pub fn new(sid: String, value: ParamValue) -> Self {
        Self {
            sid,
            value,
            document: None,
        }
    }
}

document_aware!(NewParam);

entity_builder! {
    /// Builder for [`NewParam`].
    NewParamBuilder => NewParam {
        required { sid: String, value: ParamValue }
        optional {}
        collections {}
        construct: NewParam::new,
    }
}

// ============================================================================
// Shading
// ============================================================================

/// Fixed-function shading model of a technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShadingModel {
    /// Unlit
    Constant,
    /// Diffuse only
    Lambert,
    /// Phong specular
    Phong,
    /// Blinn-Phong specular
    Blinn,
}

impl ShadingModel {
    /// Returns the element name of this model.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShadingModel::Constant => "constant",
            ShadingModel::Lambert => "lambert",
            ShadingModel::Phong => "phong",
            ShadingModel::Blinn => "blinn",
        }
    }
}

impl FromStr for ShadingModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "constant" => Ok(ShadingModel::Constant),
            "lambert" => Ok(ShadingModel::Lambert),
            "phong" => Ok(ShadingModel::Phong),
            "blinn" => Ok(ShadingModel::Blinn),
            _ => Err(Error::InvalidToken {
                kind: "shading model",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ShadingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A texture lookup used in place of a color.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Texture {
    /// Sid of the sampler parameter
    pub texture: String,
    /// Texture coordinate set symbol, bound by `bind_vertex_input`
    pub texcoord: String,
}

impl Texture {
    /// Creates a texture lookup.
    pub fn new(texture: String, texcoord: String) -> Self {
        Self { texture, texcoord }
    }
}

entity_builder! {
    /// Builder for [`Texture`].
    TextureBuilder => Texture {
        required { texture: String, texcoord: String }
        optional {}
        collections {}
        construct: Texture::new,
    }
}

/// Value of a color slot such as `<diffuse>`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorOrTexture {
    /// A literal color
    Color(Color),
    /// A texture lookup
    Texture(Texture),
    /// A reference to a parameter
    Param(String),
}

/// Value of a scalar slot such as `<shininess>`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FloatOrParam {
    /// A literal value
    Float(f32),
    /// A reference to a parameter
    Param(String),
}

/// Color-valued slots of a shading model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSlot {
    /// `<emission>`
    Emission,
    /// `<ambient>`
    Ambient,
    /// `<diffuse>`
    Diffuse,
    /// `<specular>`
    Specular,
    /// `<reflective>`
    Reflective,
    /// `<transparent>`
    Transparent,
}

impl ColorSlot {
    /// Maps an element name to its slot.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "emission" => Some(ColorSlot::Emission),
            "ambient" => Some(ColorSlot::Ambient),
            "diffuse" => Some(ColorSlot::Diffuse),
            "specular" => Some(ColorSlot::Specular),
            "reflective" => Some(ColorSlot::Reflective),
            "transparent" => Some(ColorSlot::Transparent),
            _ => None,
        }
    }
}

/// Scalar-valued slots of a shading model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatSlot {
    /// `<shininess>`
    Shininess,
    /// `<reflectivity>`
    Reflectivity,
    /// `<transparency>`
    Transparency,
    /// `<index_of_refraction>`
    IndexOfRefraction,
}

impl FloatSlot {
    /// Maps an element name to its slot.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "shininess" => Some(FloatSlot::Shininess),
            "reflectivity" => Some(FloatSlot::Reflectivity),
            "transparency" => Some(FloatSlot::Transparency),
            "index_of_refraction" => Some(FloatSlot::IndexOfRefraction),
            _ => None,
        }
    }
}

/// The shading description of a `profile_COMMON` technique.
///
/// Which slots are meaningful depends on the model: `constant` ignores
/// ambient/diffuse/specular, `lambert` ignores specular and shininess.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shader {
    /// The shading model
    pub model: ShadingModel,
    #[allow(missing_docs)]
    pub emission: Option<ColorOrTexture>,
    #[allow(missing_docs)]
    pub ambient: Option<ColorOrTexture>,
    #[allow(missing_docs)]
    pub diffuse: Option<ColorOrTexture>,
    #[allow(missing_docs)]
    pub specular: Option<ColorOrTexture>,
    #[allow(missing_docs)]
    pub reflective: Option<ColorOrTexture>,
    #[allow(missing_docs)]
    pub transparent: Option<ColorOrTexture>,
    #[allow(missing_docs)]
    pub shininess: Option<FloatOrParam>,
    #[allow(missing_docs)]
    pub reflectivity: Option<FloatOrParam>,
    #[allow(missing_docs)]
    pub transparency: Option<FloatOrParam>,
    #[allow(missing_docs)]
    pub index_of_refraction: Option<FloatOrParam>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl Shader {
    /// Creates a shader with every slot empty.
    pub fn new(model: ShadingModel) -> Self {
        Self {
            model,
            emission: None,
            ambient: None,
            diffuse: None,
            specular: None,
            reflective: None,
            transparent: None,
            shininess: None,
            reflectivity: None,
            transparency: None,
            index_of_refraction: None,
            document: None,
        }
    }

    /// Returns the value of a color slot.
    pub fn color(&self, slot: ColorSlot) -> Option<&ColorOrTexture> {
        match slot {
            ColorSlot::Emission => self.emission.as_ref(),
            ColorSlot::Ambient => self.ambient.as_ref(),
            ColorSlot::Diffuse => self.diffuse.as_ref(),
            ColorSlot::Specular => self.specular.as_ref(),
            ColorSlot::Reflective => self.reflective.as_ref(),
            ColorSlot::Transparent => self.transparent.as_ref(),
        }
    }

    /// Returns the value of a scalar slot.
    pub fn float(&self, slot: FloatSlot) -> Option<&FloatOrParam> {
        match slot {
            FloatSlot::Shininess => self.shininess.as_ref(),
            FloatSlot::Reflectivity => self.reflectivity.as_ref(),
            FloatSlot::Transparency => self.transparency.as_ref(),
            FloatSlot::IndexOfRefraction => self.index_of_refraction.as_ref(),
        }
    }
}

document_aware!(Shader);

entity_builder! {
    /// Builder for [`Shader`].
    ShaderBuilder => Shader {
        required { model: ShadingModel }
        optional {
            emission: ColorOrTexture,
            ambient: ColorOrTexture,
            diffuse: ColorOrTexture,
            specular: ColorOrTexture,
            reflective: ColorOrTexture,
            transparent: ColorOrTexture,
            shininess: FloatOrParam,
            reflectivity: FloatOrParam,
            transparency: FloatOrParam,
            index_of_refraction: FloatOrParam,
        }
        collections {}
        construct: Shader::new,
    }
}

impl ShaderBuilder {
    /// Assigns a color slot.
    pub fn set_color(&mut self, slot: ColorSlot, value: ColorOrTexture) {
        let field = match slot {
            ColorSlot::Emission => &mut self.emission,
            ColorSlot::Ambient => &mut self.ambient,
            ColorSlot::Diffuse => &mut self.diffuse,
            ColorSlot::Specular => &mut self.specular,
            ColorSlot::Reflective => &mut self.reflective,
            ColorSlot::Transparent => &mut self.transparent,
        };
        *field = Some(value);
    }

    /// Assigns a scalar slot.
    pub fn set_float(&mut self, slot: FloatSlot, value: FloatOrParam) {
        let field = match slot {
            FloatSlot::Shininess => &mut self.shininess,
            FloatSlot::Reflectivity => &mut self.reflectivity,
            FloatSlot::Transparency => &mut self.transparency,
            FloatSlot::IndexOfRefraction => &mut self.index_of_refraction,
        };
        *field = Some(value);
    }
}

// ============================================================================
// Effect
// ============================================================================

/// An effect from `<library_effects>`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Effect {
    /// Document-wide identifier
    pub id: Option<String>,
    /// Human-readable name
    pub name: Option<String>,
    params: OwnedList<NewParam>,
    /// Sid of the technique
    pub technique_sid: Option<String>,
    shader: Option<Shader>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl Effect {
    /// Creates an empty effect with the given id.
    pub fn new(id: String) -> Self {
        Self {
            id: Some(id),
            name: None,
            params: OwnedList::new(),
            technique_sid: None,
            shader: None,
            document: None,
        }
    }

    /// Looks up a parameter by sid.
    pub fn param(&self, sid: &str) -> Option<&NewParam> {
        self.params.iter().find(|p| p.sid == sid)
    }

    /// Follows a texture lookup through its sampler and surface to the
    /// image id it ultimately reads.
    pub fn texture_image(&self, texture: &Texture) -> Option<&str> {
        let sampler = match &self.param(&texture.texture)?.value {
            ParamValue::Sampler2D(s) => s,
            _ => return None,
        };
        match &self.param(sampler.source.as_deref()?)?.value {
            ParamValue::Surface(surface) => surface.init_from.as_deref(),
            _ => None,
        }
    }
}

document_aware!(Effect => params, shader);
impl_element!(Effect);
owned_fields!(Effect {
    /// Parameters declared in `profile_COMMON`
    params / update_params: OwnedList<NewParam>,
    /// Shading description, absent when the effect has no common profile
    shader / update_shader: Option<Shader>,
});

entity_builder! {
    /// Builder for [`Effect`].
    EffectBuilder => Effect {
        required { id: String }
        optional { name: String, technique_sid: String, shader: Shader }
        collections { params: OwnedList<NewParam> }
        construct: Effect::new,
    }
}
