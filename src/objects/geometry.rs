//! Geometry - meshes, their data sources and primitive groups.
//!
//! The data-flow triad lives here too: a [`Source`] owns one flat array
//! and an [`Accessor`] that reinterprets it as tuples. Vertices, primitive
//! inputs and animation samplers refer to sources by URI.

use crate::objects::common::Uri;
use crate::objects::ownership::{DocumentAware, DocumentId, OwnedList, Seal};

// ============================================================================
// Arrays
// ============================================================================

/// A `<float_array>`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloatArray {
    /// Identifier accessors point at
    pub id: Option<String>,
    /// Human-readable name
    pub name: Option<String>,
    /// The values
    pub values: Vec<f32>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl FloatArray {
    /// Creates an array holding `values`.
    pub fn new(values: Vec<f32>) -> Self {
        Self {
            id: None,
            name: None,
            values,
            document: None,
        }
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when the array holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resizes the array, keeping existing values up to the new length and
    /// filling any new slots with zero.
    pub fn resize(&mut self, len: usize) {
        self.values.resize(len, 0.0);
    }
}

/// A `<Name_array>` or `<IDREF_array>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NameArray {
    /// Identifier accessors point at
    pub id: Option<String>,
    /// Human-readable name
    pub name: Option<String>,
    /// The tokens, verbatim
    pub values: Vec<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl NameArray {
    /// Creates an array holding `values`.
    pub fn new(values: Vec<String>) -> Self {
        Self {
            id: None,
            name: None,
            values,
            document: None,
        }
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when the array holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resizes the array, keeping existing tokens up to the new length and
    /// filling any new slots with empty strings.
    pub fn resize(&mut self, len: usize) {
        self.values.resize(len, String::new());
    }
}

document_aware!(FloatArray);
impl_element!(FloatArray);
document_aware!(NameArray);
impl_element!(NameArray);

/// The array owned by a [`Source`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArrayData {
    /// `<float_array>`
    Float(FloatArray),
    /// `<Name_array>`
    Name(NameArray),
    /// `<IDREF_array>`
    IdRef(NameArray),
}

impl ArrayData {
    /// Identifier of the array.
    pub fn id(&self) -> Option<&str> {
        match self {
            ArrayData::Float(a) => a.id.as_deref(),
            ArrayData::Name(a) | ArrayData::IdRef(a) => a.id.as_deref(),
        }
    }

    /// Number of values in the array.
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Float(a) => a.len(),
            ArrayData::Name(a) | ArrayData::IdRef(a) => a.len(),
        }
    }

    /// Returns true when the array holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentAware for ArrayData {
    fn document(&self) -> Option<DocumentId> {
        match self {
            ArrayData::Float(a) => a.document(),
            ArrayData::Name(a) | ArrayData::IdRef(a) => a.document(),
        }
    }

    fn set_document(&mut self, document: Option<DocumentId>, seal: Seal) {
        match self {
            ArrayData::Float(a) => a.set_document(document, seal),
            ArrayData::Name(a) | ArrayData::IdRef(a) => a.set_document(document, seal),
        }
    }
}

// ============================================================================
// Accessor
// ============================================================================

/// One component of an accessor tuple.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Param {
    /// Component name, e.g. "X"
    pub name: Option<String>,
    /// Scoped identifier
    pub sid: Option<String>,
    /// Value type, e.g. "float"
    pub param_type: Option<String>,
    /// Semantic hint
    pub semantic: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

document_aware!(Param);

entity_builder! {
    /// Builder for [`Param`].
    ParamBuilder => Param {
        required {}
        optional { name: String, sid: String, param_type: String, semantic: String }
        collections {}
        construct: Param::default,
    }
}

/// Describes how a flat array is read as `count` tuples.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Accessor {
    /// The array being read
    pub source: Uri,
    /// Number of tuples
    pub count: u32,
    /// Distance between tuple starts (defaults to 1)
    pub stride: Option<u32>,
    /// Index of the first value read (defaults to 0)
    pub offset: Option<u32>,
    params: OwnedList<Param>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl Accessor {
    /// Creates an accessor with default stride and offset.
    pub fn new(source: Uri, count: u32) -> Self {
        Self {
            source,
            count,
            stride: None,
            offset: None,
            params: OwnedList::new(),
            document: None,
        }
    }

    /// Effective stride.
    pub fn stride(&self) -> usize {
        self.stride.unwrap_or(1).max(1) as usize
    }

    /// Effective offset.
    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0) as usize
    }

    /// Returns tuple `index` of `values`, `stride` values long.
    ///
    /// Returns `None` past `count` or past the end of `values`.
    pub fn tuple<'a, T>(&self, values: &'a [T], index: usize) -> Option<&'a [T]> {
        if index >= self.count as usize {
            return None;
        }
        let start = self.offset() + index * self.stride();
        values.get(start..start + self.stride())
    }
}

document_aware!(Accessor => params);
owned_fields!(Accessor {
    /// Tuple components
    params / update_params: OwnedList<Param>,
});

entity_builder! {
    /// Builder for [`Accessor`].
    AccessorBuilder => Accessor {
        required { source: Uri, count: u32 }
        optional { stride: u32, offset: u32 }
        collections { params: OwnedList<Param> }
        construct: Accessor::new,
    }
}

// ============================================================================
// Source
// ============================================================================

/// A `<source>`: one array plus the accessor that reads it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Source {
    /// Identifier inputs refer to
    pub id: Option<String>,
    /// Human-readable name
    pub name: Option<String>,
    array: Option<ArrayData>,
    accessor: Option<Accessor>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl Source {
    /// Creates an empty source.
    pub fn new(id: String) -> Self {
        Self {
            id: Some(id),
            name: None,
            array: None,
            accessor: None,
            document: None,
        }
    }

    /// The float values, when the array is a float array.
    pub fn floats(&self) -> Option<&[f32]> {
        match &self.array {
            Some(ArrayData::Float(a)) => Some(&a.values),
            _ => None,
        }
    }

    /// The tokens, when the array is a name or IDREF array.
    pub fn names(&self) -> Option<&[String]> {
        match &self.array {
            Some(ArrayData::Name(a)) | Some(ArrayData::IdRef(a)) => Some(&a.values),
            _ => None,
        }
    }

    /// Returns float tuple `index` through the accessor.
    pub fn float_tuple(&self, index: usize) -> Option<&[f32]> {
        self.accessor.as_ref()?.tuple(self.floats()?, index)
    }
}

document_aware!(Source => array, accessor);
impl_element!(Source);
owned_fields!(Source {
    /// The data
    array / update_array: Option<ArrayData>,
    /// How the data is read
    accessor / update_accessor: Option<Accessor>,
});

entity_builder! {
    /// Builder for [`Source`].
    SourceBuilder => Source {
        required { id: String }
        optional { name: String, array: ArrayData, accessor: Accessor }
        collections {}
        construct: Source::new,
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// An `<input>` binding a semantic to a source.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Input {
    /// Semantic, e.g. "POSITION"
    pub semantic: String,
    /// The source (or vertices) referenced
    pub source: Uri,
    /// Offset into each index tuple (shared inputs only)
    pub offset: Option<u32>,
    /// Set index, e.g. for several TEXCOORD inputs
    pub set: Option<u32>,
}

impl Input {
    /// Creates an unshared input.
    pub fn new(semantic: String, source: Uri) -> Self {
        Self {
            semantic,
            source,
            offset: None,
            set: None,
        }
    }
}

entity_builder! {
    /// Builder for [`Input`].
    InputBuilder => Input {
        required { semantic: String, source: Uri }
        optional { offset: u32, set: u32 }
        collections {}
        construct: Input::new,
    }
}

/// Number of indices per vertex of a primitive group.
pub(crate) fn input_stride(inputs: &[Input]) -> usize {
    inputs
        .iter()
        .map(|i| i.offset.unwrap_or(0) as usize + 1)
        .max()
        .unwrap_or(1)
}

/// The `<vertices>` of a mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vertices {
    /// Identifier primitive inputs refer to
    pub id: String,
    /// Human-readable name
    pub name: Option<String>,
    /// Per-vertex inputs
    pub inputs: Vec<Input>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl Vertices {
    /// Creates vertices with no inputs.
    pub fn new(id: String) -> Self {
        Self {
            id,
            name: None,
            inputs: Vec::new(),
            document: None,
        }
    }
}

document_aware!(Vertices);

entity_builder! {
    /// Builder for [`Vertices`].
    VerticesBuilder => Vertices {
        required { id: String }
        optional { name: String }
        collections { inputs: Vec<Input> }
        construct: Vertices::new,
    }
}

// ============================================================================
// Primitive groups
// ============================================================================

/// A `<triangles>` group with one flat index list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triangles {
    /// Material symbol
    pub material: Option<String>,
    /// Human-readable name
    pub name: Option<String>,
    /// Number of triangles
    pub count: u32,
    /// Shared inputs
    pub inputs: Vec<Input>,
    /// Interleaved indices
    pub indices: Vec<u32>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl Triangles {
    /// Creates an empty group.
    pub fn new(count: u32) -> Self {
        Self {
            material: None,
            name: None,
            count,
            inputs: Vec::new(),
            indices: Vec::new(),
            document: None,
        }
    }

    /// Indices per vertex.
    pub fn stride(&self) -> usize {
        input_stride(&self.inputs)
    }

    /// Returns the indices of triangle `index` (three vertices, each
    /// `stride` indices wide).
    pub fn triangle(&self, index: usize) -> Option<&[u32]> {
        let len = 3 * self.stride();
        let start = index.checked_mul(len)?;
        self.indices.get(start..start.checked_add(len)?)
    }
}

document_aware!(Triangles);

entity_builder! {
    /// Builder for [`Triangles`].
    TrianglesBuilder => Triangles {
        required { count: u32 }
        optional { material: String, name: String }
        collections { inputs: Vec<Input>, indices: Vec<u32> }
        construct: Triangles::new,
    }
}

/// A `<polygons>` group with one index list per face.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polygons {
    /// Material symbol
    pub material: Option<String>,
    /// Human-readable name
    pub name: Option<String>,
    /// Number of faces
    pub count: u32,
    /// Shared inputs
    pub inputs: Vec<Input>,
    /// One row of interleaved indices per `<p>`
    pub faces: Vec<Vec<u32>>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl Polygons {
    /// Creates an empty group.
    pub fn new(count: u32) -> Self {
        Self {
            material: None,
            name: None,
            count,
            inputs: Vec::new(),
            faces: Vec::new(),
            document: None,
        }
    }

    /// Indices per vertex.
    pub fn stride(&self) -> usize {
        input_stride(&self.inputs)
    }
}

document_aware!(Polygons);

entity_builder! {
    /// Builder for [`Polygons`].
    PolygonsBuilder => Polygons {
        required { count: u32 }
        optional { material: String, name: String }
        collections { inputs: Vec<Input>, faces: Vec<Vec<u32>> }
        construct: Polygons::new,
    }
}

/// A `<polylist>` group: vertex counts plus one flat index list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolyList {
    /// Material symbol
    pub material: Option<String>,
    /// Human-readable name
    pub name: Option<String>,
    /// Number of faces
    pub count: u32,
    /// Shared inputs
    pub inputs: Vec<Input>,
    /// Vertices per face
    pub vcount: Vec<u32>,
    /// Interleaved indices
    pub indices: Vec<u32>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl PolyList {
    /// Creates an empty group.
    pub fn new(count: u32) -> Self {
        Self {
            material: None,
            name: None,
            count,
            inputs: Vec::new(),
            vcount: Vec::new(),
            indices: Vec::new(),
            document: None,
        }
    }

    /// Indices per vertex.
    pub fn stride(&self) -> usize {
        input_stride(&self.inputs)
    }

    /// Iterates the index slice of each face.
    ///
    /// Stops early if `vcount` claims more indices than `indices` holds.
    pub fn polygons(&self) -> impl Iterator<Item = &[u32]> + '_ {
        let stride = self.stride();
        let mut start = 0usize;
        self.vcount.iter().map_while(move |&n| {
            let end = start + n as usize * stride;
            let face = self.indices.get(start..end)?;
            start = end;
            Some(face)
        })
    }
}

document_aware!(PolyList);

entity_builder! {
    /// Builder for [`PolyList`].
    PolyListBuilder => PolyList {
        required { count: u32 }
        optional { material: String, name: String }
        collections { inputs: Vec<Input>, vcount: Vec<u32>, indices: Vec<u32> }
        construct: PolyList::new,
    }
}

/// One primitive group of a mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Primitive {
    /// `<triangles>`
    Triangles(Triangles),
    /// `<polygons>`
    Polygons(Polygons),
    /// `<polylist>`
    PolyList(PolyList),
}

impl Primitive {
    /// Material symbol of the group.
    pub fn material(&self) -> Option<&str> {
        match self {
            Primitive::Triangles(p) => p.material.as_deref(),
            Primitive::Polygons(p) => p.material.as_deref(),
            Primitive::PolyList(p) => p.material.as_deref(),
        }
    }

    /// Declared face count.
    pub fn count(&self) -> u32 {
        match self {
            Primitive::Triangles(p) => p.count,
            Primitive::Polygons(p) => p.count,
            Primitive::PolyList(p) => p.count,
        }
    }

    /// Shared inputs of the group.
    pub fn inputs(&self) -> &[Input] {
        match self {
            Primitive::Triangles(p) => &p.inputs,
            Primitive::Polygons(p) => &p.inputs,
            Primitive::PolyList(p) => &p.inputs,
        }
    }
}

impl DocumentAware for Primitive {
    fn document(&self) -> Option<DocumentId> {
        match self {
            Primitive::Triangles(p) => p.document(),
            Primitive::Polygons(p) => p.document(),
            Primitive::PolyList(p) => p.document(),
        }
    }

    fn set_document(&mut self, document: Option<DocumentId>, seal: Seal) {
        match self {
            Primitive::Triangles(p) => p.set_document(document, seal),
            Primitive::Polygons(p) => p.set_document(document, seal),
            Primitive::PolyList(p) => p.set_document(document, seal),
        }
    }
}

// ============================================================================
// Mesh and Geometry
// ============================================================================

/// A `<mesh>`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mesh {
    sources: OwnedList<Source>,
    vertices: Option<Vertices>,
    primitives: OwnedList<Primitive>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl Mesh {
    /// Looks up a source by a `#id` reference.
    pub fn source(&self, uri: &Uri) -> Option<&Source> {
        let id = uri.fragment()?;
        self.sources.iter().find(|s| s.id.as_deref() == Some(id))
    }
}

document_aware!(Mesh => sources, vertices, primitives);
owned_fields!(Mesh {
    /// Data sources
    sources / update_sources: OwnedList<Source>,
    /// The vertices element
    vertices / update_vertices: Option<Vertices>,
    /// Primitive groups, in document order
    primitives / update_primitives: OwnedList<Primitive>,
});

entity_builder! {
    /// Builder for [`Mesh`].
    MeshBuilder => Mesh {
        required {}
        optional { vertices: Vertices }
        collections { sources: OwnedList<Source>, primitives: OwnedList<Primitive> }
        construct: Mesh::default,
        validate: check_mesh,
    }
}

fn check_mesh(builder: &MeshBuilder) -> crate::error::Result<()> {
    if builder.vertices.is_none() {
        return Err(crate::error::Error::MissingField {
            entity: "Mesh",
            field: "vertices",
        });
    }
    Ok(())
}

/// A geometry from `<library_geometries>`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geometry {
    /// Document-wide identifier
    pub id: Option<String>,
    /// Human-readable name
    pub name: Option<String>,
    mesh: Option<Mesh>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl Geometry {
    /// Creates an empty geometry.
    pub fn new() -> Self {
        Self {
            id: None,
            name: None,
            mesh: None,
            document: None,
        }
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

document_aware!(Geometry => mesh);
impl_element!(Geometry);
owned_fields!(Geometry {
    /// The mesh, absent for geometry kinds that are not read
    mesh / update_mesh: Option<Mesh>,
});

entity_builder! {
    /// Builder for [`Geometry`].
    GeometryBuilder => Geometry {
        required {}
        optional { id: String, name: String, mesh: Mesh }
        collections {}
        construct: Geometry::new,
    }
}
