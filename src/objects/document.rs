//! The document root and its libraries.
//!
//! A [`Document`] owns one ordered list of libraries per entity kind. Each
//! list is attached to the document's [`DocumentId`], so pushing a library
//! (with everything it contains) attaches the whole subtree in one step.
//!
//! ```rust
//! use collada_rs::objects::{Document, DocumentAware, Image, Library, Uri};
//!
//! let mut doc = Document::new();
//! let mut images = Library::new();
//! images.push(Image::new(Uri::parse("wood.png").unwrap()));
//! assert_eq!(images.items()[0].document(), None);
//!
//! doc.add_library(images);
//! let image = doc.items::<Image>().next().unwrap();
//! assert!(doc.owns(image));
//! ```

use crate::objects::animation::Animation;
use crate::objects::asset::Asset;
use crate::objects::camera::Camera;
use crate::objects::common::Uri;
use crate::objects::effect::{Effect, Material};
use crate::objects::geometry::Geometry;
use crate::objects::image::Image;
use crate::objects::light::Light;
use crate::objects::ownership::{
    edit_attached, replace_attached, DocumentAware, DocumentId, Element, OwnedList, Seal,
};
use crate::objects::scene::{Node, Scene, VisualScene};

/// A `<library_*>` element holding entities of one kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Library<T> {
    /// Identifier of the library element
    pub id: Option<String>,
    /// Human-readable name
    pub name: Option<String>,
    items: OwnedList<T>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl<T: DocumentAware> Library<T> {
    /// Creates an empty, detached library.
    pub fn new() -> Self {
        Self {
            id: None,
            name: None,
            items: OwnedList::new(),
            document: None,
        }
    }

    /// The entities, in document order.
    pub fn items(&self) -> &OwnedList<T> {
        &self.items
    }

    /// Appends an entity, attaching it to this library's document.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Edits the entities in place, then attaches them to this library's
    /// document.
    pub fn update_items<R>(&mut self, edit: impl FnOnce(&mut OwnedList<T>) -> R) -> R {
        edit_attached(&mut self.items, self.document, edit)
    }
}

impl<T: DocumentAware> Default for Library<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DocumentAware> DocumentAware for Library<T> {
    fn document(&self) -> Option<DocumentId> {
        self.document
    }

    fn set_document(&mut self, document: Option<DocumentId>, seal: Seal) {
        self.document = document;
        self.items.set_document(document, seal);
    }
}

/// An entity kind stored in its own library list on [`Document`].
pub trait LibraryItem: Element + Sized {
    /// Element name of the library, e.g. `library_images`.
    const LIBRARY_TAG: &'static str;

    /// The document's libraries of this kind.
    fn libraries(document: &Document) -> &OwnedList<Library<Self>>;

    /// Mutable access to the document's libraries of this kind.
    #[doc(hidden)]
    fn libraries_mut(document: &mut Document, seal: Seal) -> &mut OwnedList<Library<Self>>;
}

macro_rules! library_item {
    ($ty:ty, $field:ident, $tag:literal) => {
        impl LibraryItem for $ty {
            const LIBRARY_TAG: &'static str = $tag;

            fn libraries(document: &Document) -> &OwnedList<Library<Self>> {
                &document.$field
            }

            fn libraries_mut(document: &mut Document, _: Seal) -> &mut OwnedList<Library<Self>> {
                &mut document.$field
            }
        }
    };
}

library_item!(Image, images, "library_images");
library_item!(Material, materials, "library_materials");
library_item!(Effect, effects, "library_effects");
library_item!(Geometry, geometries, "library_geometries");
library_item!(Light, lights, "library_lights");
library_item!(Camera, cameras, "library_cameras");
library_item!(Animation, animations, "library_animations");
library_item!(VisualScene, visual_scenes, "library_visual_scenes");

/// A parsed COLLADA document: the sole owner of its element tree.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Document {
    #[cfg_attr(feature = "serde", serde(skip))]
    id: DocumentId,
    /// `COLLADA@version`
    pub version: Option<String>,
    asset: Option<Asset>,
    images: OwnedList<Library<Image>>,
    materials: OwnedList<Library<Material>>,
    effects: OwnedList<Library<Effect>>,
    geometries: OwnedList<Library<Geometry>>,
    lights: OwnedList<Library<Light>>,
    cameras: OwnedList<Library<Camera>>,
    animations: OwnedList<Library<Animation>>,
    visual_scenes: OwnedList<Library<VisualScene>>,
    scene: Option<Scene>,
}

impl Document {
    /// Creates an empty document with a fresh id.
    pub fn new() -> Self {
        let id = DocumentId::next();
        Self {
            id,
            version: None,
            asset: None,
            images: OwnedList::attached(id),
            materials: OwnedList::attached(id),
            effects: OwnedList::attached(id),
            geometries: OwnedList::attached(id),
            lights: OwnedList::attached(id),
            cameras: OwnedList::attached(id),
            animations: OwnedList::attached(id),
            visual_scenes: OwnedList::attached(id),
            scene: None,
        }
    }

    /// The handle elements of this document point back at.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// The libraries holding entities of kind `T`.
    pub fn libraries<T: LibraryItem>(&self) -> &OwnedList<Library<T>> {
        T::libraries(self)
    }

    /// Edits the libraries of kind `T` in place, then attaches them and
    /// everything they contain to this document.
    pub fn update_libraries<T: LibraryItem, R>(
        &mut self,
        edit: impl FnOnce(&mut OwnedList<Library<T>>) -> R,
    ) -> R {
        let id = self.id;
        edit_attached(T::libraries_mut(self, Seal), Some(id), edit)
    }

    /// Appends a library, attaching it and everything it contains.
    pub fn add_library<T: LibraryItem>(&mut self, library: Library<T>) {
        T::libraries_mut(self, Seal).push(library);
    }

    /// Iterates every entity of kind `T` across all its libraries.
    pub fn items<'a, T: LibraryItem + 'a>(&'a self) -> impl Iterator<Item = &'a T> + 'a {
        self.libraries::<T>()
            .iter()
            .flat_map(|library| library.items().iter())
    }

    /// Finds an entity of kind `T` by id.
    pub fn find<T: LibraryItem>(&self, id: &str) -> Option<&T> {
        self.items::<T>().find(|item| item.id() == Some(id))
    }

    /// Resolves a same-document reference like `#geom-1`.
    ///
    /// References into other documents resolve to `None`.
    pub fn resolve<T: LibraryItem>(&self, uri: &Uri) -> Option<&T> {
        if !uri.is_local() {
            return None;
        }
        self.find(uri.fragment()?)
    }

    /// Finds a node in any visual scene by id.
    pub fn find_node(&self, id: &str) -> Option<&Node> {
        self.items::<VisualScene>()
            .find_map(|scene| scene.find_node(id))
    }

    /// Document metadata from `<asset>`.
    pub fn asset(&self) -> Option<&Asset> {
        self.asset.as_ref()
    }

    /// Replaces the asset metadata, attaching the new value and returning
    /// the previous one detached.
    pub fn set_asset(&mut self, asset: Option<Asset>) -> Option<Asset> {
        replace_attached(&mut self.asset, asset, Some(self.id))
    }

    /// The `<scene>` element.
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// Replaces the `<scene>` element, attaching the new one and returning
    /// the previous one detached.
    pub fn set_scene(&mut self, scene: Option<Scene>) -> Option<Scene> {
        replace_attached(&mut self.scene, scene, Some(self.id))
    }

    /// Edits the `<scene>` element in place, then attaches it to this
    /// document.
    pub fn update_scene<R>(&mut self, edit: impl FnOnce(&mut Option<Scene>) -> R) -> R {
        edit_attached(&mut self.scene, Some(self.id), edit)
    }

    /// The visual scene instantiated by `<scene>`.
    pub fn active_visual_scene(&self) -> Option<&VisualScene> {
        let instance = self.scene.as_ref()?.visual_scene().as_ref()?;
        self.resolve(&instance.url)
    }

    /// Returns true when `element` is attached to this document.
    pub fn owns<E: DocumentAware + ?Sized>(&self, element: &E) -> bool {
        element.document() == Some(self.id)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::asset::parse_timestamp;
    use crate::objects::scene::Instance;

    fn visual_scene(id: &str, node_id: &str) -> VisualScene {
        let mut scene = VisualScene::new();
        scene.id = Some(id.to_string());
        let mut node = Node::new();
        node.id = Some(node_id.to_string());
        scene.update_nodes(|nodes| nodes.push(node));
        scene
    }

    #[test]
    fn test_add_library_attaches_subtree() {
        let mut doc = Document::new();
        let mut library = Library::new();
        library.push(visual_scene("vs", "root"));
        assert!(!doc.owns(&library.items()[0].nodes()[0]));

        doc.add_library(library);
        let node = doc.find_node("root").unwrap();
        assert!(doc.owns(node));
        assert!(doc.owns(&doc.libraries::<VisualScene>()[0]));
    }

    #[test]
    fn test_find_and_resolve() {
        let mut doc = Document::new();
        let mut library = Library::new();
        library.push(visual_scene("a", "n1"));
        library.push(visual_scene("b", "n2"));
        doc.add_library(library);

        assert!(doc.find::<VisualScene>("b").is_some());
        assert!(doc.find::<VisualScene>("c").is_none());
        assert!(doc
            .resolve::<VisualScene>(&Uri::parse("#a").unwrap())
            .is_some());
        assert!(doc
            .resolve::<VisualScene>(&Uri::parse("other.dae#a").unwrap())
            .is_none());
        assert_eq!(doc.items::<Image>().count(), 0);
    }

    #[test]
    fn test_active_visual_scene() {
        let mut doc = Document::new();
        let mut library = Library::new();
        library.push(visual_scene("main", "n"));
        doc.add_library(library);
        assert!(doc.active_visual_scene().is_none());

        let mut scene = Scene::new();
        scene.update_visual_scene(|v| *v = Some(Instance::new(Uri::parse("#main").unwrap())));
        assert!(doc.set_scene(Some(scene)).is_none());
        assert!(doc.owns(doc.scene().unwrap()));
        assert!(doc.owns(doc.scene().unwrap().visual_scene().as_ref().unwrap()));
        assert_eq!(
            doc.active_visual_scene().and_then(|s| s.id.as_deref()),
            Some("main")
        );

        let old = doc.set_scene(None).unwrap();
        assert_eq!(old.document(), None);
    }

    #[test]
    fn test_removed_library_detaches() {
        let mut doc = Document::new();
        let mut library = Library::new();
        library.push(visual_scene("vs", "root"));
        doc.add_library(library);

        let removed = doc
            .update_libraries::<VisualScene, _>(|libraries| libraries.remove(0))
            .unwrap();
        assert_eq!(removed.document(), None);
        assert_eq!(removed.items()[0].nodes()[0].document(), None);
        assert!(doc.find_node("root").is_none());
    }

    #[test]
    fn test_replaced_libraries_stay_attached() {
        let mut doc = Document::new();
        let mut detached = OwnedList::new();
        let mut library = Library::new();
        library.push(visual_scene("vs", "root"));
        detached.push(library);
        assert_eq!(detached.document(), None);

        doc.update_libraries::<VisualScene, _>(|libraries| *libraries = detached);
        assert!(doc.owns(doc.libraries::<VisualScene>()));
        assert!(doc.owns(doc.find_node("root").unwrap()));

        doc.update_libraries::<VisualScene, _>(|libraries| {
            libraries.update(0, |library| {
                library.update_items(|items| {
                    items.update(0, |scene| {
                        scene.update_nodes(|nodes| *nodes = OwnedList::new());
                        scene.update_nodes(|nodes| nodes.push(Node::new()));
                    })
                })
            })
        });
        let scene = doc.find::<VisualScene>("vs").unwrap();
        assert!(doc.owns(&scene.nodes()[0]));
    }

    #[test]
    fn test_asset_is_attached() {
        let mut doc = Document::new();
        let created = parse_timestamp("2020-01-01T00:00:00Z").unwrap();
        assert!(doc.set_asset(Some(Asset::new(created, created))).is_none());
        assert!(doc.owns(doc.asset().unwrap()));

        let old = doc.set_asset(None).unwrap();
        assert_eq!(old.document(), None);
        assert!(doc.asset().is_none());
    }

    #[test]
    fn test_documents_have_distinct_ids() {
        assert_ne!(Document::new().id(), Document::new().id());
        assert_eq!(<Image as LibraryItem>::LIBRARY_TAG, "library_images");
    }
}
