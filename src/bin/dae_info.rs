//! dae_info - Summarize the contents of a COLLADA document.
//!
//! Reads a `.dae` file and prints its asset metadata, the number of items
//! in each library, and optionally the node hierarchy of the active visual
//! scene.
//!
//! # Usage
//!
//! ```bash
//! dae_info [OPTIONS] <FILE>
//! ```
//!
//! # Examples
//!
//! ```bash
//! # Print library counts
//! dae_info model.dae
//!
//! # Also print the scene graph
//! dae_info --tree model.dae
//!
//! # Abort on mismatched closing tags and show parser diagnostics
//! dae_info --strict --debug model.dae
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::Parser;

use collada_rs::objects::{
    Animation, Camera, Document, Effect, Geometry, Image, Light, LibraryItem, Material, Node,
    VisualScene,
};
use collada_rs::{parse_with_config, ParserConfig};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Summarize the contents of a COLLADA document.
#[derive(Parser, Debug)]
#[command(name = "dae_info")]
#[command(version = VERSION)]
#[command(about = "Summarize the contents of a COLLADA document")]
struct Args {
    /// COLLADA file to read
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Print the node hierarchy of the active visual scene
    #[arg(short, long)]
    tree: bool,

    /// Treat mismatched closing tags as errors
    #[arg(long)]
    strict: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn print_count<T: LibraryItem>(doc: &Document, label: &str) {
    let libraries = doc.libraries::<T>().len();
    let items = doc.items::<T>().count();
    if libraries > 0 {
        println!("  {:<14} {:>6} ({} libraries)", label, items, libraries);
    }
}

fn print_node(node: &Node, depth: usize) {
    let indent = "  ".repeat(depth + 1);
    let label = node
        .id
        .as_deref()
        .or(node.name.as_deref())
        .unwrap_or("<unnamed>");
    let mut parts = Vec::new();
    if !node.transforms().is_empty() {
        parts.push(format!("{} transforms", node.transforms().len()));
    }
    for geometry in node.instance_geometries().iter() {
        parts.push(format!("geometry {}", geometry.url));
    }
    for light in node.instance_lights().iter() {
        parts.push(format!("light {}", light.url));
    }
    for camera in node.instance_cameras().iter() {
        parts.push(format!("camera {}", camera.url));
    }
    if parts.is_empty() {
        println!("{}{}", indent, label);
    } else {
        println!("{}{} [{}]", indent, label, parts.join(", "));
    }
    for child in node.children().iter() {
        print_node(child, depth + 1);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = if args.strict {
        ParserConfig::strict()
    } else {
        ParserConfig::lenient()
    };

    let file = File::open(&args.path)?;
    let doc = parse_with_config(BufReader::new(file), config)?;

    println!("{}", args.path.display());
    if let Some(version) = &doc.version {
        println!("  version        {}", version);
    }
    if let Some(asset) = doc.asset() {
        println!("  up axis        {}", asset.up_axis_or_default().as_str());
        println!("  meters/unit    {}", asset.meters_per_unit());
        for contributor in &asset.contributors {
            if let Some(tool) = &contributor.authoring_tool {
                println!("  authoring tool {}", tool);
            }
        }
    }

    print_count::<Image>(&doc, "images");
    print_count::<Material>(&doc, "materials");
    print_count::<Effect>(&doc, "effects");
    print_count::<Geometry>(&doc, "geometries");
    print_count::<Light>(&doc, "lights");
    print_count::<Camera>(&doc, "cameras");
    print_count::<Animation>(&doc, "animations");
    print_count::<VisualScene>(&doc, "visual scenes");

    if args.tree {
        match doc.active_visual_scene() {
            Some(scene) => {
                println!(
                    "scene {}",
                    scene.id.as_deref().unwrap_or("<unnamed>")
                );
                for node in scene.nodes().iter() {
                    print_node(node, 0);
                }
            }
            None => println!("no active visual scene"),
        }
    }

    Ok(())
}
