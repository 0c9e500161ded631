//! COLLADA (`.dae`) reader for Rust.
//!
//! This crate reads COLLADA 1.4/1.5 documents in a single streaming pass
//! and builds a cross-referenced in-memory model of the scene they
//! describe.
//!
//! # Features
//!
//! - **Core Types**: Images, materials, effects, geometry, lights, cameras,
//!   animations and visual scenes, each with a validating builder.
//! - **Streaming Parser**: Large numeric arrays are decoded as text
//!   arrives, without buffering whole elements.
//! - **Ownership Tracking**: Every element knows which document it belongs
//!   to, so lookups can be checked against the right document.
//! - **Serde Support**: Optional serialization with the `serde` feature.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use collada_rs::objects::Geometry;
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let file = File::open("model.dae").unwrap();
//! let doc = collada_rs::parse(BufReader::new(file)).unwrap();
//!
//! for geometry in doc.items::<Geometry>() {
//!     println!("Geometry: {:?}", geometry.id);
//! }
//!
//! if let Some(scene) = doc.active_visual_scene() {
//!     for node in scene.all_nodes() {
//!         println!("Node: {:?}", node.id);
//!     }
//! }
//! ```
//!
//! # Event-Level API
//!
//! [`ColladaHandler`] can be driven directly by any source of markup
//! events:
//!
//! ```rust
//! use collada_rs::{Attributes, ColladaHandler};
//!
//! let mut handler = ColladaHandler::new();
//! handler.element_opened("COLLADA", &Attributes::new()).unwrap();
//! handler.element_closed("COLLADA").unwrap();
//! let doc = handler.finish().unwrap();
//! assert_eq!(doc.items::<collada_rs::objects::Image>().count(), 0);
//! ```
//!
//! # Module Structure
//!
//! - [`objects`] - Core COLLADA data structures
//! - [`parser`] - Event-driven document builder
//! - [`reader`] - Streaming XML front end
//! - [`decode`] - Incremental number decoding
//! - [`config`] - Parser settings
//! - [`error`] - Error types
//!
//! # Optional Features
//!
//! - `serde` - Enable serde serialization support
//! - `cli` - Build the `dae_info` command-line tool

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod decode;
pub mod error;
pub mod objects;
pub mod parser;
pub mod reader;

// Re-export commonly used types at the crate root
pub use config::ParserConfig;
pub use error::{Error, ErrorKind, Result};
pub use objects::{
    Animation, Asset, Camera, Document, Effect, Geometry, Image, Light, Material, Mesh, Node,
    Scene, Uri, VisualScene,
};
pub use parser::{Attributes, ColladaHandler};
pub use reader::{parse, parse_file, parse_str, parse_with_config, ColladaReader};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
