//! Arena storage for an ordered tree of named elements.
//!
//! Nodes are addressed by [`NodeId`], a slot index paired with the slot's
//! generation. Removing a node frees its whole subtree and bumps the
//! generation of every freed slot, so ids that outlive their node are
//! rejected by [`Document::contains`] instead of aliasing a recycled slot.

use crate::error::{TreeError, TreeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    element: Option<Element>,
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: Option<NodeId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root.filter(|id| self.contains(*id))
    }

    /// Replaces the root element with a fresh, empty element named `name`.
    pub fn set_root(&mut self, name: &str) -> NodeId {
        if let Some(old) = self.root.take() {
            self.remove(old);
        }
        let id = self.allocate(Element::new(name, None, None));
        self.root = Some(id);
        id
    }

    /// Returns true while `id` refers to a node that has not been removed.
    pub fn contains(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    /// Appends a new element under `parent`, holding `text` when given.
    ///
    /// # Panics
    ///
    /// Panics if `parent` has been removed. Use [`Document::try_create_child`]
    /// when the handle may be stale.
    pub fn create_child(&mut self, parent: NodeId, name: &str, text: Option<&str>) -> NodeId {
        match self.try_create_child(parent, name, text) {
            Ok(id) => id,
            Err(err) => panic!("{err}"),
        }
    }

    /// Appends a new element under `parent`. Whitespace-only text left on the
    /// parent by the parser is dropped once it gains a child.
    pub fn try_create_child(
        &mut self,
        parent: NodeId,
        name: &str,
        text: Option<&str>,
    ) -> TreeResult<NodeId> {
        if !self.contains(parent) {
            return Err(TreeError::StaleNode);
        }
        let id = self.allocate(Element::new(name, Some(parent), text));
        if let Some(element) = self.element_mut(parent) {
            if element.text.trim().is_empty() {
                element.text.clear();
            }
            element.children.push(id);
        }
        Ok(id)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|element| element.name.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.element(id).and_then(|element| element.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.element(id)
            .map(|element| element.children.as_slice())
            .unwrap_or(&[])
    }

    /// Direct text held by the element itself, excluding descendants.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|element| element.text.as_str())
    }

    /// Concatenated text of the element and all descendants in document order.
    pub fn content(&self, id: NodeId) -> Option<String> {
        let element = self.element(id)?;
        if element.children.is_empty() {
            return Some(element.text.clone());
        }

        let mut content = element.text.clone();
        for child in &element.children {
            if let Some(nested) = self.content(*child) {
                content.push_str(&nested);
            }
        }
        Some(content)
    }

    /// Replaces everything below `id` with the given text.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        let children = match self.element_mut(id) {
            Some(element) => {
                element.text = text.to_string();
                std::mem::take(&mut element.children)
            }
            None => return,
        };
        for child in children {
            self.free_subtree(child);
        }
    }

    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        self.element(id)
            .map(|element| element.attributes.as_slice())
            .unwrap_or(&[])
    }

    pub fn attribute(&self, id: NodeId, key: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attribute(&mut self, id: NodeId, key: &str, value: &str) {
        let Some(element) = self.element_mut(id) else {
            return;
        };
        match element.attributes.iter_mut().find(|(name, _)| name == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => element
                .attributes
                .push((key.to_string(), value.to_string())),
        }
    }

    /// Unlinks `id` from its parent and frees it together with its subtree.
    /// Returns false when the node was already gone.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.element(id).map(|element| element.parent) else {
            return false;
        };

        match parent {
            Some(parent) => {
                if let Some(element) = self.element_mut(parent) {
                    element.children.retain(|child| *child != id);
                }
            }
            None => {
                if self.root == Some(id) {
                    self.root = None;
                }
            }
        }

        self.free_subtree(id);
        true
    }

    /// Number of live elements in the document.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.element.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn attach_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub(crate) fn create_detached(&mut self, name: &str) -> NodeId {
        self.allocate(Element::new(name, None, None))
    }

    pub(crate) fn append_text(&mut self, id: NodeId, text: &str) {
        if let Some(element) = self.element_mut(id) {
            element.text.push_str(text);
        }
    }

    pub(crate) fn clear_text(&mut self, id: NodeId) {
        if let Some(element) = self.element_mut(id) {
            element.text.clear();
        }
    }

    fn element(&self, id: NodeId) -> Option<&Element> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.element.as_ref()
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.element.as_mut()
    }

    fn allocate(&mut self, element: Element) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.element = Some(element);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }

        let index = u32::try_from(self.slots.len()).expect("node arena exceeds u32::MAX slots");
        self.slots.push(Slot {
            generation: 0,
            element: Some(element),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let Some(slot) = self.slots.get_mut(current.index as usize) else {
                continue;
            };
            if slot.generation != current.generation {
                continue;
            }
            if let Some(element) = slot.element.take() {
                pending.extend(element.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
            }
        }
    }
}

impl Element {
    fn new(name: &str, parent: Option<NodeId>, text: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            text: text.unwrap_or_default().to_string(),
            parent,
            children: Vec::new(),
        }
    }
}
