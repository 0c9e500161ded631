//! The event-driven state machine that builds a [`Document`].
//!
//! [`ColladaHandler`] consumes element-opened, element-closed and text
//! notifications in document order, with no lookahead. It keeps a stack of
//! frames, one per tracked open element, each owning the builder for that
//! element. Closing an element finalizes its frame and moves the result
//! into the parent frame; the root frame owns the document itself.
//!
//! ```rust
//! use collada_rs::parser::{Attributes, ColladaHandler};
//! use collada_rs::objects::Image;
//!
//! let mut handler = ColladaHandler::new();
//! let none = Attributes::new();
//! handler.element_opened("COLLADA", &none).unwrap();
//! handler.element_opened("library_images", &none).unwrap();
//! handler.element_opened("image", &[("id", "img-1")].into_iter().collect()).unwrap();
//! handler.element_opened("init_from", &none).unwrap();
//! handler.text_fragment("te").unwrap();
//! handler.text_fragment("st.jpg").unwrap();
//! for tag in ["init_from", "image", "library_images", "COLLADA"] {
//!     handler.element_closed(tag).unwrap();
//! }
//!
//! let doc = handler.finish().unwrap();
//! let image = doc.find::<Image>("img-1").unwrap();
//! assert_eq!(image.source.as_str(), "test.jpg");
//! ```

mod attach;
mod attributes;
mod enter;
mod frame;

pub use attributes::Attributes;

use crate::config::ParserConfig;
use crate::error::{Error, Result};
use crate::objects::Document;
use attach::attach;
use enter::enter;
use frame::{Built, Frame, Mode};
use log::debug;

/// Builds one document from a stream of markup notifications.
///
/// A handler parses exactly one document; [`finish`](Self::finish)
/// consumes it.
#[derive(Debug)]
pub struct ColladaHandler {
    config: ParserConfig,
    stack: Vec<Frame>,
    skip_depth: usize,
    document: Option<Document>,
}

impl ColladaHandler {
    /// Creates a handler with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Creates a handler with an explicit configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            stack: Vec::new(),
            skip_depth: 0,
            document: None,
        }
    }

    /// Number of tracked elements currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns true while inside an element that is being skipped.
    pub fn is_skipping(&self) -> bool {
        self.skip_depth > 0
    }

    /// The nearest frame that is not a pass-through group.
    fn target_mut(&mut self) -> Option<&mut Mode> {
        self.stack
            .iter_mut()
            .rev()
            .map(|frame| &mut frame.mode)
            .find(|mode| !mode.is_passthrough())
    }

    /// Handles a start tag.
    pub fn element_opened(&mut self, name: &str, attrs: &Attributes) -> Result<()> {
        if self.skip_depth > 0 {
            self.skip_depth += 1;
            return Ok(());
        }

        let at_root = self.stack.is_empty();
        if at_root && self.document.is_some() {
            debug!("ignoring <{}> after the document root closed", name);
            self.skip_depth = 1;
            return Ok(());
        }

        let target = if at_root { None } else { self.target_mut() };
        match enter(target, name, attrs)? {
            Some(mode) => {
                if let Some(max) = self.config.max_depth {
                    if self.stack.len() >= max {
                        return Err(Error::Structural(format!(
                            "<{}> exceeds the maximum depth of {}",
                            name, max
                        )));
                    }
                }
                self.stack.push(Frame {
                    tag: name.to_string(),
                    mode,
                });
            }
            None => {
                debug!("skipping <{}> subtree", name);
                self.skip_depth = 1;
            }
        }
        Ok(())
    }

    /// Handles a fragment of character data.
    ///
    /// Fragments may split tokens anywhere; list-valued elements decode
    /// them incrementally.
    pub fn text_fragment(&mut self, text: &str) -> Result<()> {
        if self.skip_depth > 0 {
            return Ok(());
        }
        match self.stack.last_mut() {
            Some(frame) => frame.mode.add_text(text),
            None => Ok(()),
        }
    }

    /// Handles an end tag.
    pub fn element_closed(&mut self, name: &str) -> Result<()> {
        if self.skip_depth > 0 {
            self.skip_depth -= 1;
            return Ok(());
        }

        let expected = match self.stack.last() {
            Some(frame) if frame.tag == name => None,
            Some(frame) => Some(frame.tag.clone()),
            None => Some(String::new()),
        };
        if let Some(expected) = expected {
            if self.config.strict_tags {
                return Err(Error::TagMismatch {
                    expected,
                    found: name.to_string(),
                });
            }
            debug!("ignoring </{}> while inside <{}>", name, expected);
            return Ok(());
        }

        let Some(Frame { tag, mode }) = self.stack.pop() else {
            return Err(Error::Structural("close with an empty stack".to_string()));
        };
        match mode.finish(&tag)? {
            Some(Built::Document(document)) => self.document = Some(document),
            Some(built) => {
                let target = self.target_mut().ok_or_else(|| {
                    Error::Structural(format!("<{}> closed with no parent", tag))
                })?;
                attach(target, &tag, built)?;
            }
            None => {}
        }
        Ok(())
    }

    /// Returns the finished document.
    ///
    /// Fails if no `COLLADA` root was seen or if elements are still open.
    pub fn finish(self) -> Result<Document> {
        if !self.stack.is_empty() || self.skip_depth > 0 {
            let open = self
                .stack
                .last()
                .map_or_else(String::new, |frame| frame.tag.clone());
            return Err(Error::Structural(format!(
                "document ended inside <{}> ({} elements still open)",
                open,
                self.stack.len() + self.skip_depth
            )));
        }
        self.document
            .ok_or_else(|| Error::Structural("no COLLADA root element".to_string()))
    }
}

impl Default for ColladaHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::objects::{DocumentAware, Geometry, Image, Primitive};

    fn open(handler: &mut ColladaHandler, tag: &str, attrs: &[(&str, &str)]) {
        handler
            .element_opened(tag, &attrs.iter().copied().collect())
            .unwrap();
    }

    fn close(handler: &mut ColladaHandler, tags: &[&str]) {
        for tag in tags {
            handler.element_closed(tag).unwrap();
        }
    }

    fn start_mesh(handler: &mut ColladaHandler) {
        open(handler, "COLLADA", &[]);
        open(handler, "library_geometries", &[]);
        open(handler, "geometry", &[("id", "g")]);
        open(handler, "mesh", &[]);
        open(handler, "vertices", &[("id", "v")]);
        close(handler, &["vertices"]);
    }

    fn end_mesh(handler: &mut ColladaHandler) {
        close(handler, &["mesh", "geometry", "library_geometries", "COLLADA"]);
    }

    #[test]
    fn test_float_array_across_fragments() {
        let mut handler = ColladaHandler::new();
        start_mesh(&mut handler);
        open(&mut handler, "source", &[("id", "pos")]);
        open(&mut handler, "float_array", &[("id", "pos-a"), ("count", "3")]);
        for chunk in ["1.", "5 2", ".25\n", "3"] {
            handler.text_fragment(chunk).unwrap();
        }
        close(&mut handler, &["float_array", "source"]);
        end_mesh(&mut handler);

        let doc = handler.finish().unwrap();
        let mesh = doc.find::<Geometry>("g").unwrap().mesh().as_ref().unwrap();
        assert_eq!(mesh.sources()[0].floats(), Some(&[1.5, 2.25, 3.0][..]));
        assert!(doc.owns(&mesh.sources()[0]));
    }

    #[test]
    fn test_polygons_rows() {
        let mut handler = ColladaHandler::new();
        start_mesh(&mut handler);
        open(&mut handler, "polygons", &[("count", "2")]);
        open(&mut handler, "input", &[("semantic", "VERTEX"), ("source", "#v"), ("offset", "0")]);
        close(&mut handler, &["input"]);
        for row in ["0 1 2", "2 3 0 1"] {
            open(&mut handler, "p", &[]);
            handler.text_fragment(row).unwrap();
            close(&mut handler, &["p"]);
        }
        close(&mut handler, &["polygons"]);
        end_mesh(&mut handler);

        let doc = handler.finish().unwrap();
        let mesh = doc.find::<Geometry>("g").unwrap().mesh().as_ref().unwrap();
        match &mesh.primitives()[0] {
            Primitive::Polygons(p) => {
                assert_eq!(p.faces, vec![vec![0, 1, 2], vec![2, 3, 0, 1]]);
            }
            other => panic!("unexpected primitive {:?}", other),
        }
    }

    #[test]
    fn test_unknown_subtree_is_skipped() {
        let mut handler = ColladaHandler::new();
        open(&mut handler, "COLLADA", &[]);
        open(&mut handler, "library_controllers", &[]);
        assert!(handler.is_skipping());
        open(&mut handler, "controller", &[]);
        handler.text_fragment("not a number").unwrap();
        // a close tag inside the skipped subtree never reaches the stack
        close(&mut handler, &["controller", "library_controllers"]);
        assert!(!handler.is_skipping());
        assert_eq!(handler.depth(), 1);
        close(&mut handler, &["COLLADA"]);
        assert!(handler.finish().is_ok());
    }

    #[test]
    fn test_mismatched_close_lenient() {
        let mut handler = ColladaHandler::new();
        open(&mut handler, "COLLADA", &[]);
        open(&mut handler, "library_images", &[]);
        handler.element_closed("library_lights").unwrap();
        assert_eq!(handler.depth(), 2);
        close(&mut handler, &["library_images", "COLLADA"]);
        assert!(handler.finish().is_ok());
    }

    #[test]
    fn test_mismatched_close_strict() {
        let mut handler = ColladaHandler::with_config(ParserConfig::strict());
        open(&mut handler, "COLLADA", &[]);
        open(&mut handler, "library_images", &[]);
        let err = handler.element_closed("library_lights").unwrap_err();
        assert!(matches!(
            err,
            Error::TagMismatch { ref expected, ref found }
                if expected == "library_images" && found == "library_lights"
        ));
    }

    #[test]
    fn test_finish_requires_root_mode() {
        let mut handler = ColladaHandler::new();
        open(&mut handler, "COLLADA", &[]);
        let err = handler.finish().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);

        let handler = ColladaHandler::new();
        assert!(matches!(handler.finish(), Err(Error::Structural(_))));
    }

    #[test]
    fn test_max_depth() {
        let mut handler = ColladaHandler::with_config(ParserConfig::new().with_max_depth(Some(2)));
        open(&mut handler, "COLLADA", &[]);
        open(&mut handler, "library_images", &[]);
        let err = handler
            .element_opened("image", &Attributes::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
    }

    #[test]
    fn test_library_attaches_on_close() {
        let mut handler = ColladaHandler::new();
        open(&mut handler, "COLLADA", &[]);
        open(&mut handler, "library_images", &[]);
        open(&mut handler, "image", &[("id", "a")]);
        open(&mut handler, "init_from", &[]);
        open(&mut handler, "ref", &[]);
        handler.text_fragment(" a.png ").unwrap();
        close(&mut handler, &["ref", "init_from", "image", "library_images", "COLLADA"]);

        let doc = handler.finish().unwrap();
        let image = doc.find::<Image>("a").unwrap();
        assert_eq!(image.source.as_str(), "a.png");
        assert_eq!(image.document(), Some(doc.id()));
    }

    #[test]
    fn test_missing_required_field_aborts() {
        let mut handler = ColladaHandler::new();
        open(&mut handler, "COLLADA", &[]);
        open(&mut handler, "library_images", &[]);
        open(&mut handler, "image", &[("id", "a")]);
        let err = handler.element_closed("image").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
