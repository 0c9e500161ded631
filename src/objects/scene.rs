//! Visual scenes, the node hierarchy and the instances it places.

use crate::error::{Error, Result};
use crate::objects::common::Uri;
use crate::objects::ownership::{DocumentId, OwnedList};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Transforms
// ============================================================================

/// The kind of a transformation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransformKind {
    /// 4x4 row-major matrix
    Matrix,
    /// Translation vector
    Translate,
    /// Axis and angle in degrees
    Rotate,
    /// Per-axis scale
    Scale,
    /// Eye, interest and up points
    LookAt,
    /// Angle, rotation axis and translation axis
    Skew,
}

impl TransformKind {
    /// Number of values the transform carries.
    pub fn arity(&self) -> usize {
        match self {
            TransformKind::Matrix => 16,
            TransformKind::Translate => 3,
            TransformKind::Rotate => 4,
            TransformKind::Scale => 3,
            TransformKind::LookAt => 9,
            TransformKind::Skew => 7,
        }
    }

    /// Returns the element name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformKind::Matrix => "matrix",
            TransformKind::Translate => "translate",
            TransformKind::Rotate => "rotate",
            TransformKind::Scale => "scale",
            TransformKind::LookAt => "lookat",
            TransformKind::Skew => "skew",
        }
    }
}

impl FromStr for TransformKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "matrix" => Ok(TransformKind::Matrix),
            "translate" => Ok(TransformKind::Translate),
            "rotate" => Ok(TransformKind::Rotate),
            "scale" => Ok(TransformKind::Scale),
            "lookat" => Ok(TransformKind::LookAt),
            "skew" => Ok(TransformKind::Skew),
            _ => Err(Error::InvalidToken {
                kind: "transform",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One step of a node's transform chain.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    /// Kind of step
    pub kind: TransformKind,
    /// Scoped identifier, the target of animation channels
    pub sid: Option<String>,
    /// Exactly `kind.arity()` values
    pub values: Vec<f32>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl Transform {
    /// Creates a transform, checking the value count.
    pub fn new(kind: TransformKind, values: Vec<f32>) -> Result<Self> {
        if values.len() != kind.arity() {
            return Err(Error::InvalidValueCount {
                element: kind.as_str().to_string(),
                expected: kind.arity().to_string(),
                found: values.len(),
            });
        }
        Ok(Self {
            kind,
            sid: None,
            values,
            document: None,
        })
    }
}

document_aware!(Transform);

// ============================================================================
// Instances
// ============================================================================

/// An instance of a light, camera, node or visual scene.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instance {
    /// The instantiated element
    pub url: Uri,
    /// Scoped identifier
    pub sid: Option<String>,
    /// Human-readable name
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl Instance {
    /// Creates an instance of `url`.
    pub fn new(url: Uri) -> Self {
        Self {
            url,
            sid: None,
            name: None,
            document: None,
        }
    }
}

document_aware!(Instance);

entity_builder! {
    /// Builder for [`Instance`].
    InstanceBuilder => Instance {
        required { url: Uri }
        optional { sid: String, name: String }
        collections {}
        construct: Instance::new,
    }
}

/// Binds an effect texcoord symbol to a mesh input set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BindVertexInput {
    /// Symbol used by the effect
    pub semantic: String,
    /// Mesh input semantic, e.g. "TEXCOORD"
    pub input_semantic: String,
    /// Mesh input set
    pub input_set: Option<u32>,
}

impl BindVertexInput {
    /// Creates a binding.
    pub fn new(semantic: String, input_semantic: String) -> Self {
        Self {
            semantic,
            input_semantic,
            input_set: None,
        }
    }
}

entity_builder! {
    /// Builder for [`BindVertexInput`].
    BindVertexInputBuilder => BindVertexInput {
        required { semantic: String, input_semantic: String }
        optional { input_set: u32 }
        collections {}
        construct: BindVertexInput::new,
    }
}

/// Binds a primitive group's material symbol to a material.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceMaterial {
    /// Symbol used by primitive groups
    pub symbol: String,
    /// The material
    pub target: Uri,
    /// Scoped identifier
    pub sid: Option<String>,
    /// Human-readable name
    pub name: Option<String>,
    /// Texcoord bindings
    pub vertex_inputs: Vec<BindVertexInput>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl InstanceMaterial {
    /// Creates a binding of `symbol` to `target`.
    pub fn new(symbol: String, target: Uri) -> Self {
        Self {
            symbol,
            target,
            sid: None,
            name: None,
            vertex_inputs: Vec::new(),
            document: None,
        }
    }
}

document_aware!(InstanceMaterial);

entity_builder! {
    /// Builder for [`InstanceMaterial`].
    InstanceMaterialBuilder => InstanceMaterial {
        required { symbol: String, target: Uri }
        optional { sid: String, name: String }
        collections { vertex_inputs: Vec<BindVertexInput> }
        construct: InstanceMaterial::new,
    }
}

/// An instance of a geometry with its material bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceGeometry {
    /// The geometry
    pub url: Uri,
    /// Scoped identifier
    pub sid: Option<String>,
    /// Human-readable name
    pub name: Option<String>,
    materials: OwnedList<InstanceMaterial>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl InstanceGeometry {
    /// Creates an instance of `url` with no bindings.
    pub fn new(url: Uri) -> Self {
        Self {
            url,
            sid: None,
            name: None,
            materials: OwnedList::new(),
            document: None,
        }
    }

    /// Returns the material bound to `symbol`.
    pub fn material(&self, symbol: &str) -> Option<&InstanceMaterial> {
        self.materials.iter().find(|m| m.symbol == symbol)
    }
}

document_aware!(InstanceGeometry => materials);
owned_fields!(InstanceGeometry {
    /// Material bindings from `<bind_material>`
    materials / update_materials: OwnedList<InstanceMaterial>,
});

entity_builder! {
    /// Builder for [`InstanceGeometry`].
    InstanceGeometryBuilder => InstanceGeometry {
        required { url: Uri }
        optional { sid: String, name: String }
        collections { materials: OwnedList<InstanceMaterial> }
        construct: InstanceGeometry::new,
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// Node type attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeType {
    /// Ordinary node
    #[default]
    Node,
    /// Skeleton joint
    Joint,
}

impl FromStr for NodeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "NODE" => Ok(NodeType::Node),
            "JOINT" => Ok(NodeType::Joint),
            _ => Err(Error::InvalidToken {
                kind: "node type",
                value: s.to_string(),
            }),
        }
    }
}

/// A scene graph node.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    /// Document-wide identifier
    pub id: Option<String>,
    /// Scoped identifier
    pub sid: Option<String>,
    /// Human-readable name
    pub name: Option<String>,
    /// Node type, NODE when absent
    pub node_type: Option<NodeType>,
    transforms: OwnedList<Transform>,
    instance_geometries: OwnedList<InstanceGeometry>,
    instance_lights: OwnedList<Instance>,
    instance_cameras: OwnedList<Instance>,
    instance_nodes: OwnedList<Instance>,
    children: OwnedList<Node>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl Node {
    /// Creates an empty node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterates this node's descendants depth-first, in document order,
    /// excluding the node itself.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }
}

document_aware!(Node => transforms, instance_geometries, instance_lights, instance_cameras, instance_nodes, children);
impl_element!(Node, sid);
owned_fields!(Node {
    /// Transform chain, applied in order
    transforms / update_transforms: OwnedList<Transform>,
    /// `<instance_geometry>` children
    instance_geometries / update_instance_geometries: OwnedList<InstanceGeometry>,
    /// `<instance_light>` children
    instance_lights / update_instance_lights: OwnedList<Instance>,
    /// `<instance_camera>` children
    instance_cameras / update_instance_cameras: OwnedList<Instance>,
    /// `<instance_node>` children
    instance_nodes / update_instance_nodes: OwnedList<Instance>,
    /// Child nodes
    children / update_children: OwnedList<Node>,
});

entity_builder! {
    /// Builder for [`Node`].
    NodeBuilder => Node {
        required {}
        optional { id: String, sid: String, name: String, node_type: NodeType }
        collections {
            transforms: OwnedList<Transform>,
            instance_geometries: OwnedList<InstanceGeometry>,
            instance_lights: OwnedList<Instance>,
            instance_cameras: OwnedList<Instance>,
            instance_nodes: OwnedList<Instance>,
            children: OwnedList<Node>,
        }
        construct: Node::new,
    }
}

/// Depth-first iterator returned by [`Node::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

// ============================================================================
// Visual scene and scene
// ============================================================================

/// A visual scene from `<library_visual_scenes>`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisualScene {
    /// Document-wide identifier
    pub id: Option<String>,
    /// Human-readable name
    pub name: Option<String>,
    nodes: OwnedList<Node>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl VisualScene {
    /// Creates an empty visual scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterates every node of the scene depth-first.
    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes
            .iter()
            .flat_map(|root| std::iter::once(root).chain(root.descendants()))
    }

    /// Finds a node anywhere in the hierarchy by id.
    pub fn find_node(&self, id: &str) -> Option<&Node> {
        self.all_nodes().find(|n| n.id.as_deref() == Some(id))
    }
}

document_aware!(VisualScene => nodes);
impl_element!(VisualScene);
owned_fields!(VisualScene {
    /// Root nodes
    nodes / update_nodes: OwnedList<Node>,
});

entity_builder! {
    /// Builder for [`VisualScene`].
    VisualSceneBuilder => VisualScene {
        required {}
        optional { id: String, name: String }
        collections { nodes: OwnedList<Node> }
        construct: VisualScene::new,
    }
}

/// The `<scene>` element: which visual scene is active.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scene {
    visual_scene: Option<Instance>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl Scene {
    /// Creates a scene with no active visual scene.
    pub fn new() -> Self {
        Self::default()
    }
}

document_aware!(Scene => visual_scene);
owned_fields!(Scene {
    /// `<instance_visual_scene>`
    visual_scene / update_visual_scene: Option<Instance>,
});

entity_builder! {
    /// Builder for [`Scene`].
    SceneBuilder => Scene {
        required {}
        optional { visual_scene: Instance }
        collections {}
        construct: Scene::new,
    }
}
