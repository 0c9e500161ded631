//! COLLADA streaming reader.
//!
//! This module drives [`ColladaHandler`] from a `quick-xml` event stream.
//! Nothing is buffered beyond the current event: list-valued elements are
//! decoded as their text arrives.
//!
//! # Example
//!
//! ```rust,no_run
//! use collada_rs::reader::ColladaReader;
//! use collada_rs::objects::Geometry;
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let file = File::open("scene.dae").unwrap();
//! let doc = ColladaReader::from_reader(BufReader::new(file)).read().unwrap();
//!
//! for geometry in doc.items::<Geometry>() {
//!     println!("Geometry: {:?}", geometry.id);
//! }
//! ```

use crate::config::ParserConfig;
use crate::error::Result;
use crate::objects::Document;
use crate::parser::{Attributes, ColladaHandler};
use log::debug;
use quick_xml::events::BytesStart;
use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str;

/// Reads one COLLADA document from any `BufRead` source.
pub struct ColladaReader<R: BufRead> {
    reader: Reader<R>,
    handler: ColladaHandler,
    buf: Vec<u8>,
}

impl<R: BufRead> ColladaReader<R> {
    /// Creates a reader with the default configuration.
    pub fn from_reader(reader: R) -> Self {
        Self::with_config(reader, ParserConfig::default())
    }

    /// Creates a reader with an explicit configuration.
    pub fn with_config(reader: R, config: ParserConfig) -> Self {
        let mut xml_reader = Reader::from_reader(reader);
        // whitespace is a token delimiter, so text is passed through untouched
        xml_reader.config_mut().trim_text(false);

        Self {
            reader: xml_reader,
            handler: ColladaHandler::with_config(config),
            buf: Vec::with_capacity(8192),
        }
    }

    /// Consumes the whole stream and returns the document.
    pub fn read(mut self) -> Result<Document> {
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                XmlEvent::Start(ref e) => {
                    let name = local_name(e)?;
                    let attrs = extract_attrs(e)?;
                    self.handler.element_opened(&name, &attrs)?;
                }
                XmlEvent::End(ref e) => {
                    let local = e.local_name();
                    let name = str::from_utf8(local.as_ref())?;
                    self.handler.element_closed(name)?;
                }
                XmlEvent::Empty(ref e) => {
                    let name = local_name(e)?;
                    let attrs = extract_attrs(e)?;
                    self.handler.element_opened(&name, &attrs)?;
                    self.handler.element_closed(&name)?;
                }
                XmlEvent::Text(ref e) => {
                    let text = e.unescape()?;
                    self.handler.text_fragment(&text)?;
                }
                XmlEvent::CData(ref e) => {
                    let text = str::from_utf8(e.as_ref())?;
                    self.handler.text_fragment(text)?;
                }
                XmlEvent::Eof => break,
                _ => {}
            }
        }
        debug!(
            "reached end of input at byte {}",
            self.reader.buffer_position()
        );
        self.handler.finish()
    }
}

fn local_name(e: &BytesStart<'_>) -> Result<String> {
    let local = e.local_name();
    Ok(str::from_utf8(local.as_ref())?.to_string())
}

/// Extracts attributes from a start tag as owned data.
fn extract_attrs(e: &BytesStart<'_>) -> Result<Attributes> {
    let mut attrs = Attributes::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = attr.key.local_name();
        let key = str::from_utf8(key.as_ref())?.to_string();
        let value = attr.unescape_value()?.to_string();
        attrs.push(key, value);
    }
    Ok(attrs)
}

/// Parses a complete document with the default configuration.
pub fn parse<R: BufRead>(reader: R) -> Result<Document> {
    ColladaReader::from_reader(reader).read()
}

/// Parses a complete document with an explicit configuration.
pub fn parse_with_config<R: BufRead>(reader: R, config: ParserConfig) -> Result<Document> {
    ColladaReader::with_config(reader, config).read()
}

/// Parses a document held in memory.
pub fn parse_str(xml: &str) -> Result<Document> {
    parse(xml.as_bytes())
}

/// Opens and parses a `.dae` file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let file = File::open(path)?;
    parse(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};
    use crate::objects::{
        Animation, Camera, ColorOrTexture, DocumentAware, Effect, Geometry, Image, Light,
        LightType, Material, ParamValue, Primitive, Projection, ShadingModel, TransformKind,
        UpAxis, VisualScene,
    };
    use std::io::{Cursor, Write};

    const IMAGE_DAE: &str = r##"<?xml version="1.0" encoding="utf-8"?>
<COLLADA xmlns="http://www.collada.org/2005/11/COLLADASchema" version="1.4.1">
  <library_images>
    <image id="img-1">
      <init_from>test.jpg</init_from>
    </image>
  </library_images>
</COLLADA>"##;

    const SCENE_DAE: &str = r##"<?xml version="1.0" encoding="utf-8"?>
<COLLADA xmlns="http://www.collada.org/2005/11/COLLADASchema" version="1.4.1">
  <asset>
    <contributor>
      <author>Jane</author>
      <authoring_tool>Blender 2.79</authoring_tool>
    </contributor>
    <created>2017-03-01T10:00:00</created>
    <modified>2017-03-02T11:30:00Z</modified>
    <unit name="centimeter" meter="0.01"/>
    <up_axis>Z_UP</up_axis>
  </asset>
  <library_cameras>
    <camera id="cam" name="Camera">
      <optics>
        <technique_common>
          <perspective>
            <xfov sid="xfov">49.1</xfov>
            <aspect_ratio>1.777</aspect_ratio>
            <znear sid="znear">0.1</znear>
            <zfar sid="zfar">100</zfar>
          </perspective>
        </technique_common>
      </optics>
      <extra><technique profile="blender"><shiftx>0</shiftx></technique></extra>
    </camera>
  </library_cameras>
  <library_lights>
    <light id="lamp">
      <technique_common>
        <spot>
          <color>1 1 1</color>
          <constant_attenuation>1</constant_attenuation>
          <falloff_angle>45</falloff_angle>
        </spot>
      </technique_common>
    </light>
  </library_lights>
  <library_effects>
    <effect id="wood-fx">
      <profile_COMMON>
        <newparam sid="wood-surface">
          <surface type="2D"><init_from>wood-img</init_from></surface>
        </newparam>
        <newparam sid="wood-sampler">
          <sampler2D>
            <source>wood-surface</source>
            <minfilter>LINEAR_MIPMAP_LINEAR</minfilter>
          </sampler2D>
        </newparam>
        <technique sid="common">
          <phong>
            <emission><color sid="emission">0 0 0 1</color></emission>
            <diffuse><texture texture="wood-sampler" texcoord="UVMap"/></diffuse>
            <shininess><float sid="shininess">50</float></shininess>
          </phong>
        </technique>
      </profile_COMMON>
    </effect>
  </library_effects>
  <library_materials>
    <material id="wood" name="wood">
      <instance_effect url="#wood-fx"/>
    </material>
  </library_materials>
  <library_geometries>
    <geometry id="quad" name="Quad">
      <mesh>
        <source id="quad-pos">
          <float_array id="quad-pos-array" count="12">0 0 0  1 0 0  1 1 0  0 1 0</float_array>
          <technique_common>
            <accessor source="#quad-pos-array" count="4" stride="3">
              <param name="X" type="float"/>
              <param name="Y" type="float"/>
              <param name="Z" type="float"/>
            </accessor>
          </technique_common>
        </source>
        <vertices id="quad-verts">
          <input semantic="POSITION" source="#quad-pos"/>
        </vertices>
        <polylist material="wood-material" count="1">
          <input semantic="VERTEX" source="#quad-verts" offset="0"/>
          <vcount>4</vcount>
          <p>0 1 2 3</p>
        </polylist>
        <triangles count="2">
          <input semantic="VERTEX" source="#quad-verts" offset="0"/>
          <p>0 1 2 <!-- split --> 2 3 0</p>
        </triangles>
      </mesh>
    </geometry>
  </library_geometries>
  <library_animations>
    <animation id="spin">
      <animation id="spin-z">
        <source id="spin-times">
          <float_array id="spin-times-array" count="2">0 1</float_array>
        </source>
        <sampler id="spin-sampler">
          <input semantic="INPUT" source="#spin-times"/>
        </sampler>
        <channel source="#spin-sampler" target="root/rotZ.ANGLE"/>
      </animation>
    </animation>
  </library_animations>
  <library_visual_scenes>
    <visual_scene id="main">
      <node id="root" name="Root" type="NODE">
        <translate sid="location">0 0 1</translate>
        <rotate sid="rotZ">0 0 1 90</rotate>
        <instance_geometry url="#quad">
          <bind_material>
            <technique_common>
              <instance_material symbol="wood-material" target="#wood">
                <bind_vertex_input semantic="UVMap" input_semantic="TEXCOORD" input_set="0"/>
              </instance_material>
            </technique_common>
          </bind_material>
        </instance_geometry>
        <node id="child">
          <instance_light url="#lamp"/>
          <instance_camera url="#cam"/>
        </node>
      </node>
    </visual_scene>
  </library_visual_scenes>
  <scene>
    <instance_visual_scene url="#main"/>
  </scene>
</COLLADA>"##;

    #[test]
    fn test_image_end_to_end() {
        let doc = parse(Cursor::new(IMAGE_DAE)).unwrap();

        assert_eq!(doc.version.as_deref(), Some("1.4.1"));
        let libraries = doc.libraries::<Image>();
        assert_eq!(libraries.len(), 1);
        let images = libraries[0].items();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].id.as_deref(), Some("img-1"));
        assert_eq!(images[0].source.as_str(), "test.jpg");
        assert_eq!(images[0].document(), Some(doc.id()));
    }

    #[test]
    fn test_full_scene() {
        let doc = parse_str(SCENE_DAE).unwrap();

        let asset = doc.asset().unwrap();
        assert!(doc.owns(asset));
        assert_eq!(asset.up_axis, Some(UpAxis::Z));
        assert_eq!(asset.meters_per_unit(), 0.01);
        assert_eq!(asset.contributors[0].author.as_deref(), Some("Jane"));

        let camera = doc.find::<Camera>("cam").unwrap();
        match &camera.projection {
            Projection::Perspective(p) => {
                assert_eq!(p.xfov, Some(49.1));
                assert_eq!(p.zfar, 100.0);
            }
            _ => panic!("expected a perspective camera"),
        }

        let light = doc.find::<Light>("lamp").unwrap();
        assert_eq!(light.light_type, LightType::Spot);
        assert_eq!(light.falloff_angle, Some(45.0));

        let effect = doc.find::<Effect>("wood-fx").unwrap();
        assert_eq!(effect.technique_sid.as_deref(), Some("common"));
        let shader = effect.shader().as_ref().unwrap();
        assert!(doc.owns(shader));
        assert!(doc.owns(&effect.params()[0]));
        assert_eq!(shader.model, ShadingModel::Phong);
        match shader.diffuse.as_ref().unwrap() {
            ColorOrTexture::Texture(t) => {
                assert_eq!(effect.texture_image(t), Some("wood-img"));
            }
            other => panic!("unexpected diffuse {:?}", other),
        }

        let material = doc.find::<Material>("wood").unwrap();
        let resolved: &Effect = doc.resolve(&material.instance_effect).unwrap();
        assert_eq!(resolved.id.as_deref(), Some("wood-fx"));

        let mesh = doc.find::<Geometry>("quad").unwrap().mesh().as_ref().unwrap();
        assert_eq!(mesh.sources()[0].float_tuple(2), Some(&[1.0, 1.0, 0.0][..]));
        let accessor = mesh.sources()[0].accessor().as_ref().unwrap();
        assert_eq!(accessor.params().len(), 3);
        assert!(doc.owns(accessor));
        assert!(doc.owns(&accessor.params()[2]));
        assert!(doc.owns(mesh.vertices().as_ref().unwrap()));
        assert!(mesh.primitives().iter().all(|p| doc.owns(p)));
        match &mesh.primitives()[0] {
            Primitive::PolyList(p) => {
                let faces: Vec<&[u32]> = p.polygons().collect();
                assert_eq!(faces, vec![&[0, 1, 2, 3][..]]);
            }
            other => panic!("unexpected primitive {:?}", other),
        }
        match &mesh.primitives()[1] {
            Primitive::Triangles(t) => assert_eq!(t.triangle(1), Some(&[2, 3, 0][..])),
            other => panic!("unexpected primitive {:?}", other),
        }

        let spin = doc.find::<Animation>("spin").unwrap();
        assert_eq!(spin.channel_count(), 1);
        let spin_z = &spin.children()[0];
        assert_eq!(spin_z.channels[0].target_id(), "root");
        assert!(doc.owns(&spin_z.sources()[0]));
        assert!(doc.owns(&spin_z.samplers()[0]));

        let scene = doc.active_visual_scene().unwrap();
        assert_eq!(scene.id.as_deref(), Some("main"));
        let root = scene.find_node("root").unwrap();
        assert_eq!(root.transforms()[1].kind, TransformKind::Rotate);
        assert_eq!(root.transforms()[1].sid.as_deref(), Some("rotZ"));
        assert!(doc.owns(&root.transforms()[1]));
        let binding = root.instance_geometries()[0].material("wood-material").unwrap();
        assert_eq!(binding.vertex_inputs[0].input_set, Some(0));
        assert!(doc.owns(binding));
        let child = doc.find_node("child").unwrap();
        assert_eq!(child.instance_lights().len(), 1);
        assert_eq!(child.instance_cameras().len(), 1);
        assert!(doc.owns(child));
        assert!(doc.owns(&child.instance_cameras()[0]));
        assert!(doc.owns(doc.scene().unwrap().visual_scene().as_ref().unwrap()));
        assert_eq!(doc.items::<VisualScene>().count(), 1);
    }

    #[test]
    fn test_raw_fixture_keeps_fragment_urls() {
        assert!(SCENE_DAE.contains(r##"url="#wood-fx""##));
        assert!(SCENE_DAE.trim_end().ends_with("</COLLADA>"));
    }

    #[test]
    fn test_newparam_vectors_and_unsupported_values() {
        let xml = SCENE_DAE.replace(
            "<newparam sid=\"wood-surface\">",
            "<newparam sid=\"tint\"><float3>1 0 0.5</float3></newparam>\
             <newparam sid=\"mtx\"><float4x4>1 0 0 0 0 1 0 0 0 0 1 0 0 0 0 1</float4x4></newparam>\
             <newparam sid=\"wood-surface\">",
        );
        let doc = parse_str(&xml).unwrap();
        let effect = doc.find::<Effect>("wood-fx").unwrap();

        assert_eq!(
            effect.param("tint").map(|p| &p.value),
            Some(&ParamValue::Floats(vec![1.0, 0.0, 0.5]))
        );
        assert!(effect.param("mtx").is_none());
        assert_eq!(effect.params().len(), 3);
        assert!(effect.param("wood-sampler").is_some());
    }

    #[test]
    fn test_ref_outside_init_from_is_skipped() {
        let xml = SCENE_DAE.replace(
            "<created>2017-03-01T10:00:00</created>",
            "<created><ref>ignored</ref>2017-03-01T10:00:00</created>",
        );
        let doc = parse_str(&xml).unwrap();
        let created = doc.asset().unwrap().created;
        assert_eq!(created.to_rfc3339(), "2017-03-01T10:00:00+00:00");

        let xml = IMAGE_DAE.replace(
            "<init_from>test.jpg</init_from>",
            "<init_from><ref>textures/test.jpg</ref></init_from>",
        );
        let doc = parse_str(&xml).unwrap();
        let image = doc.find::<Image>("img-1").unwrap();
        assert_eq!(image.source.as_str(), "textures/test.jpg");
    }

    #[test]
    fn test_bad_float_aborts() {
        let xml = IMAGE_DAE.replace(
            "<library_images>",
            "<library_lights><light id=\"l\"><technique_common><point>\
             <color>1 x 1</color></point></technique_common></light></library_lights>\
             <library_images>",
        );
        let err = parse_str(&xml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(matches!(err, Error::InvalidFloat { ref value, .. } if value == "x"));
    }

    #[test]
    fn test_missing_required_field_aborts() {
        let xml = IMAGE_DAE.replace("<init_from>test.jpg</init_from>", "");
        assert!(matches!(
            parse_str(&xml),
            Err(Error::MissingField {
                entity: "Image",
                field: "source"
            })
        ));
    }

    #[test]
    fn test_bad_uri_aborts() {
        let xml = IMAGE_DAE.replace("test.jpg", "bad file.jpg");
        assert!(matches!(parse_str(&xml), Err(Error::InvalidUri { .. })));
    }

    #[test]
    fn test_truncated_document() {
        let xml = "<COLLADA><library_images><image id=\"a\">";
        let err = parse_str(xml).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Structural | ErrorKind::Xml));

        assert!(matches!(parse_str("<dae/>"), Err(Error::Structural(_))));
    }

    #[test]
    fn test_strict_config() {
        let doc = parse_with_config(Cursor::new(SCENE_DAE), ParserConfig::strict()).unwrap();
        assert_eq!(doc.items::<Image>().count(), 0);
        assert_eq!(doc.items::<Geometry>().count(), 1);

        // the tokenizer catches unbalanced markup before the handler does
        let err = parse_str("<COLLADA><asset></scene></COLLADA>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Xml);
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCENE_DAE.as_bytes()).unwrap();
        file.flush().unwrap();

        let doc = parse_file(file.path()).unwrap();
        assert!(doc.find::<Geometry>("quad").is_some());

        assert!(matches!(
            parse_file(file.path().with_extension("missing")),
            Err(Error::Io(_))
        ));
    }
}
