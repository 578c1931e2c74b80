//! Payloads for `Text`, `Comment`, `CDATASection`, `ProcessingInstruction`
//! and `DocumentType` nodes.
//!
//! [`CharacterData`](https://dom.spec.whatwg.org/#interface-characterdata),
//! [`DocumentType`](https://dom.spec.whatwg.org/#interface-documenttype),
//! [`ProcessingInstruction`](https://dom.spec.whatwg.org/#interface-processinginstruction)

use crate::document::Document;
use crate::error::{DomException, DomResult};
use crate::interner::Atom;
use crate::mutation_observer::notify_character_data_change;
use crate::node::{Node, NodePayload};

/// Shared payload for `Text`, `Comment`, and `CDATASection` — all three
/// are "just data" with no further structure.
#[derive(Debug, Clone, Default)]
pub struct CharacterDataPayload {
    /// The node's text content.
    pub data: String,
}

/// A `DocumentType` node's fixed triple.
#[derive(Debug, Clone)]
pub struct DocumentTypeData {
    /// The doctype name, e.g. `"html"`.
    pub name: Atom,
    /// The doctype's public identifier.
    pub public_id: String,
    /// The doctype's system identifier.
    pub system_id: String,
}

/// A `ProcessingInstruction` node.
#[derive(Debug, Clone)]
pub struct ProcessingInstructionData {
    /// The instruction's target, e.g. `"xml-stylesheet"`.
    pub target: Atom,
    /// The instruction's data.
    pub data: String,
}

impl Node {
    fn with_character_data<T>(&self, f: impl FnOnce(&CharacterDataPayload) -> T) -> Option<T> {
        let inner = self.borrow();
        match &inner.payload {
            NodePayload::Text(d) | NodePayload::Comment(d) | NodePayload::CDataSection(d) => Some(f(d)),
            _ => None,
        }
    }

    /// `CharacterData.data`. `None` if this node has no character data.
    #[must_use]
    pub fn character_data(&self) -> Option<String> {
        self.with_character_data(|d| d.data.clone())
    }

    /// `CharacterData.length`.
    #[must_use]
    pub fn character_data_len(&self) -> Option<usize> {
        self.with_character_data(|d| d.data.chars().count())
    }

    /// `CharacterData.data = value` (the whole-replace setter).
    pub fn set_character_data(&self, value: &str) -> DomResult<()> {
        self.splice_character_data(0, self.character_data_len().unwrap_or(0), value)
    }

    /// `substringData(offset, count)`.
    pub fn substring_data(&self, offset: usize, count: usize) -> DomResult<String> {
        let data = self
            .character_data()
            .ok_or_else(|| DomException::InvalidState("node has no character data".to_string()))?;
        let chars: Vec<char> = data.chars().collect();
        if offset > chars.len() {
            return Err(DomException::InvalidState("offset out of range".to_string()));
        }
        let end = (offset + count).min(chars.len());
        Ok(chars[offset..end].iter().collect())
    }

    /// `appendData(data)`.
    pub fn append_character_data(&self, data: &str) -> DomResult<()> {
        let len = self.character_data_len().unwrap_or(0);
        self.splice_character_data(len, 0, data)
    }

    /// `insertData(offset, data)`.
    pub fn insert_character_data(&self, offset: usize, data: &str) -> DomResult<()> {
        self.splice_character_data(offset, 0, data)
    }

    /// `deleteData(offset, count)`.
    pub fn delete_character_data(&self, offset: usize, count: usize) -> DomResult<()> {
        self.splice_character_data(offset, count, "")
    }

    /// `replaceData(offset, count, data)`, and the common primitive
    /// behind every other `CharacterData` mutation method.
    pub fn splice_character_data(&self, offset: usize, count: usize, data: &str) -> DomResult<()> {
        let old_value = {
            let mut inner = self.borrow_mut();
            let payload = match &mut inner.payload {
                NodePayload::Text(d) | NodePayload::Comment(d) | NodePayload::CDataSection(d) => d,
                _ => return Err(DomException::InvalidState("node has no character data".to_string())),
            };
            let old_value = payload.data.clone();
            let mut chars: Vec<char> = payload.data.chars().collect();
            if offset > chars.len() {
                return Err(DomException::InvalidState("offset out of range".to_string()));
            }
            let end = (offset + count).min(chars.len());
            chars.splice(offset..end, data.chars());
            payload.data = chars.into_iter().collect();
            old_value
        };
        notify_character_data_change(self, Some(old_value));
        Ok(())
    }

    /// `Text.splitText(offset)`: truncates this node's data to `offset`
    /// and returns a new sibling `Text` node holding the remainder,
    /// inserted immediately after `self` if `self` currently has a parent.
    ///
    /// # Errors
    /// Returns [`DomException::InvalidState`] if this node is not a
    /// `Text` node, or if `offset` exceeds its length.
    pub fn split_text(&self, offset: usize) -> DomResult<Node> {
        let data = {
            let inner = self.borrow();
            match &inner.payload {
                NodePayload::Text(d) => d.data.clone(),
                _ => return Err(DomException::InvalidState("splitText is only valid on Text nodes".to_string())),
            }
        };
        let chars: Vec<char> = data.chars().collect();
        if offset > chars.len() {
            return Err(DomException::InvalidState("offset out of range".to_string()));
        }
        let before: String = chars[..offset].iter().collect();
        let after: String = chars[offset..].iter().collect();

        let owner = self
            .owner_document()
            .ok_or_else(|| DomException::InvalidState("node has no owner document".to_string()))?;
        let new_text = Document::from_node(owner).create_text_node(&after)?;
        self.splice_character_data(0, chars.len(), &before)?;
        if let Some(parent) = self.parent() {
            crate::tree::insert_before(&parent, &new_text, self.next_sibling().as_ref())?;
        }
        Ok(new_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_text_leaves_two_siblings_under_a_parent() {
        let doc = Document::new(None);
        let parent = doc.create_element("p").unwrap();
        crate::tree::append_child(doc.node(), &parent).unwrap();
        let text = doc.create_text_node("Hello World").unwrap();
        crate::tree::append_child(&parent, &text).unwrap();

        let tail = text.split_text(6).unwrap();
        assert_eq!(text.character_data().as_deref(), Some("Hello "));
        assert_eq!(tail.character_data().as_deref(), Some("World"));
        assert_eq!(parent.children().count(), 2);
    }

    #[test]
    fn split_text_on_detached_node_still_returns_remainder() {
        let doc = Document::new(None);
        let text = doc.create_text_node("abcdef").unwrap();
        let tail = text.split_text(3).unwrap();
        assert_eq!(text.character_data().as_deref(), Some("abc"));
        assert_eq!(tail.character_data().as_deref(), Some("def"));
    }
}
