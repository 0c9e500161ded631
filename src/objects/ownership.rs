//! Document back-references and the containers that keep them in sync.
//!
//! A [`Document`](crate::objects::Document) is the sole owner of its tree.
//! Elements only hold a copyable [`DocumentId`] pointing back at it. An
//! [`OwnedList`] keeps that id consistent: every member's document always
//! equals the list's own document, whatever mutation is applied.
//!
//! Only this crate can set a document directly. Callers mutate attached
//! elements through closures (`OwnedList::update`, the `update_*` methods
//! on entities) that re-attach the edited value once the closure returns.

use std::ops::{Deref, Index};
use std::sync::atomic::{AtomicU64, Ordering};

/// Non-owning handle identifying one [`Document`](crate::objects::Document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(u64);

impl DocumentId {
    /// Allocates a handle that is unique within this process.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        DocumentId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric value of the handle.
    pub fn get(&self) -> u64 {
        self.0
    }
}

mod sealed {
    /// Token required to set a document; it cannot be named outside the crate.
    #[derive(Debug, Clone, Copy)]
    pub struct Seal;
}

pub(crate) use sealed::Seal;

/// Something that knows which document it belongs to.
pub trait DocumentAware {
    /// The owning document, or `None` when detached.
    fn document(&self) -> Option<DocumentId>;

    /// Sets the owning document, cascading into any owned containers.
    #[doc(hidden)]
    fn set_document(&mut self, document: Option<DocumentId>, seal: Seal);
}

impl<T: DocumentAware> DocumentAware for Option<T> {
    fn document(&self) -> Option<DocumentId> {
        self.as_ref().and_then(T::document)
    }

    fn set_document(&mut self, document: Option<DocumentId>, seal: Seal) {
        if let Some(item) = self {
            item.set_document(document, seal);
        }
    }
}

/// Runs `edit` on `slot`, then attaches `slot` to `document` again.
pub(crate) fn edit_attached<T: DocumentAware, R>(
    slot: &mut T,
    document: Option<DocumentId>,
    edit: impl FnOnce(&mut T) -> R,
) -> R {
    let result = edit(slot);
    slot.set_document(document, Seal);
    result
}

/// Replaces an optional child, attaching the new value to `document` and
/// returning the previous one detached.
pub(crate) fn replace_attached<T: DocumentAware>(
    slot: &mut Option<T>,
    value: Option<T>,
    document: Option<DocumentId>,
) -> Option<T> {
    let mut previous = std::mem::replace(slot, value);
    slot.set_document(document, Seal);
    previous.set_document(None, Seal);
    previous
}

/// A node of the document tree.
pub trait Element: DocumentAware {
    /// Document-wide identifier.
    fn id(&self) -> Option<&str>;

    /// Identifier scoped to the enclosing element.
    fn sid(&self) -> Option<&str> {
        None
    }

    /// Human-readable name.
    fn name(&self) -> Option<&str>;
}

/// An ordered list whose members always share the list's document.
///
/// Inserting an element attaches it to the list's document; removing one
/// detaches it. Read access goes through the slice the list derefs to;
/// in-place edits go through [`update`](Self::update) and
/// [`update_all`](Self::update_all).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OwnedList<T> {
    items: Vec<T>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl<T> Default for OwnedList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            document: None,
        }
    }
}

impl<T: DocumentAware> OwnedList<T> {
    /// Creates an empty, detached list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty list attached to `document`.
    pub fn attached(document: DocumentId) -> Self {
        Self {
            items: Vec::new(),
            document: Some(document),
        }
    }

    /// Appends an element, attaching it to this list's document.
    pub fn push(&mut self, mut item: T) {
        item.set_document(self.document, Seal);
        self.items.push(item);
    }

    /// Inserts an element at `index`, attaching it to this list's document.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, mut item: T) {
        item.set_document(self.document, Seal);
        self.items.insert(index, item);
    }

    /// Removes and returns the element at `index`, detached.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.items.len() {
            return None;
        }
        let mut item = self.items.remove(index);
        item.set_document(None, Seal);
        Some(item)
    }

    /// Removes every element matching `pred`, returning them detached.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> Vec<T> {
        self.retain(|item| !pred(item))
    }

    /// Keeps only the elements matching `keep`, returning the others detached.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) -> Vec<T> {
        let (kept, mut removed): (Vec<T>, Vec<T>) =
            std::mem::take(&mut self.items).into_iter().partition(|item| keep(item));
        self.items = kept;
        for item in &mut removed {
            item.set_document(None, Seal);
        }
        removed
    }

    /// Removes all elements, returning them detached.
    pub fn take_all(&mut self) -> Vec<T> {
        let mut removed = std::mem::take(&mut self.items);
        for item in &mut removed {
            item.set_document(None, Seal);
        }
        removed
    }

    /// Removes and drops all elements.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Edits the element at `index` in place. The element (or whatever
    /// replaced it) is attached to this list's document afterwards.
    ///
    /// Returns `None` when `index` is out of bounds.
    pub fn update<R>(&mut self, index: usize, edit: impl FnOnce(&mut T) -> R) -> Option<R> {
        let document = self.document;
        let item = self.items.get_mut(index)?;
        Some(edit_attached(item, document, edit))
    }

    /// Edits every element in place, re-attaching each one afterwards.
    pub fn update_all(&mut self, mut edit: impl FnMut(&mut T)) {
        let document = self.document;
        for item in &mut self.items {
            edit_attached(item, document, &mut edit);
        }
    }

    /// Consumes the list, returning its elements detached.
    pub fn into_detached(mut self) -> Vec<T> {
        self.take_all()
    }
}

impl<T: DocumentAware> DocumentAware for OwnedList<T> {
    fn document(&self) -> Option<DocumentId> {
        self.document
    }

    fn set_document(&mut self, document: Option<DocumentId>, seal: Seal) {
        self.document = document;
        for item in &mut self.items {
            item.set_document(document, seal);
        }
    }
}

impl<T: DocumentAware> Extend<T> for OwnedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<T: DocumentAware> FromIterator<T> for OwnedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T> Deref for OwnedList<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<T> Index<usize> for OwnedList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a OwnedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: PartialEq> PartialEq for OwnedList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq> Eq for OwnedList<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Leaf {
        id: Option<String>,
        name: Option<String>,
        document: Option<DocumentId>,
    }

    impl Leaf {
        fn new(id: &str) -> Self {
            Self {
                id: Some(id.to_string()),
                name: None,
                document: None,
            }
        }
    }

    document_aware!(Leaf);
    impl_element!(Leaf);

    #[derive(Debug, Clone)]
    struct Branch {
        children: OwnedList<Leaf>,
        document: Option<DocumentId>,
    }

    document_aware!(Branch => children);

    #[test]
    fn test_push_attaches() {
        let doc = DocumentId::next();
        let mut list = OwnedList::attached(doc);
        list.push(Leaf::new("a"));
        list.insert(0, Leaf::new("b"));
        assert!(list.iter().all(|l| l.document() == Some(doc)));
        assert_eq!(list[0].id(), Some("b"));
    }

    #[test]
    fn test_last_attach_wins() {
        let first = DocumentId::next();
        let second = DocumentId::next();
        let mut a = OwnedList::attached(first);
        let mut b = OwnedList::attached(second);

        a.push(Leaf::new("x"));
        let leaf = a.remove(0).unwrap();
        assert_eq!(leaf.document(), None);

        let mut leaf = leaf;
        leaf.set_document(Some(first), Seal);
        b.push(leaf);
        assert_eq!(b[0].document(), Some(second));
    }

    #[test]
    fn test_set_document_cascades() {
        let doc = DocumentId::next();
        let mut list: OwnedList<Leaf> = ["a", "b"].iter().map(|id| Leaf::new(id)).collect();
        assert!(list.iter().all(|l| l.document().is_none()));

        list.set_document(Some(doc), Seal);
        assert!(list.iter().all(|l| l.document() == Some(doc)));

        list.set_document(None, Seal);
        assert!(list.iter().all(|l| l.document().is_none()));
    }

    #[test]
    fn test_nested_cascade() {
        let doc = DocumentId::next();
        let mut branch = Branch {
            children: OwnedList::new(),
            document: None,
        };
        branch.children.push(Leaf::new("inner"));
        assert_eq!(branch.children[0].document(), None);

        let mut root = OwnedList::attached(doc);
        root.push(branch);
        assert_eq!(root[0].children.document(), Some(doc));
        assert_eq!(root[0].children[0].document(), Some(doc));
    }

    #[test]
    fn test_removals_detach() {
        let doc = DocumentId::next();
        let mut list = OwnedList::attached(doc);
        list.extend(["a", "b", "c", "d"].iter().map(|id| Leaf::new(id)));

        let removed = list.remove_where(|l| l.id() == Some("a"));
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].document(), None);

        let dropped = list.retain(|l| l.id() != Some("b"));
        assert_eq!(dropped[0].id(), Some("b"));
        assert_eq!(dropped[0].document(), None);
        assert_eq!(list.len(), 2);

        let rest = list.take_all();
        assert!(list.is_empty());
        assert!(rest.iter().all(|l| l.document().is_none()));
        assert_eq!(list.document(), Some(doc));
    }

    #[test]
    fn test_remove_out_of_bounds() {
        let mut list: OwnedList<Leaf> = OwnedList::new();
        assert!(list.remove(3).is_none());
        assert!(list.update(3, |_| ()).is_none());
    }

    #[test]
    fn test_update_reattaches() {
        let doc = DocumentId::next();
        let mut list = OwnedList::attached(doc);
        list.push(Leaf::new("a"));
        list.push(Leaf::new("b"));

        let old = list.update(0, |leaf| std::mem::replace(leaf, Leaf::new("fresh")));
        assert_eq!(old.and_then(|l| l.id), Some("a".to_string()));
        assert_eq!(list[0].id(), Some("fresh"));
        assert_eq!(list[0].document(), Some(doc));

        list.update_all(|leaf| leaf.name = Some("renamed".to_string()));
        assert!(list
            .iter()
            .all(|l| l.name() == Some("renamed") && l.document() == Some(doc)));
    }

    #[test]
    fn test_update_reattaches_nested() {
        let doc = DocumentId::next();
        let mut root = OwnedList::attached(doc);
        root.push(Branch {
            children: OwnedList::new(),
            document: None,
        });

        root.update(0, |branch| {
            let mut detached = OwnedList::new();
            detached.push(Leaf::new("swapped"));
            branch.children = detached;
        });
        assert_eq!(root[0].children.document(), Some(doc));
        assert_eq!(root[0].children[0].document(), Some(doc));
    }

    #[test]
    fn test_replace_attached() {
        let doc = DocumentId::next();
        let mut slot = None;
        assert!(replace_attached(&mut slot, Some(Leaf::new("a")), Some(doc)).is_none());
        assert_eq!(slot.document(), Some(doc));

        let old = replace_attached(&mut slot, Some(Leaf::new("b")), Some(doc)).unwrap();
        assert_eq!(old.document(), None);
        assert_eq!(slot.as_ref().and_then(|l| l.id()), Some("b"));
    }
}
