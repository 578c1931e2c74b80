//! Selectors Level 4 parsing and matching over the node graph.
//!
//! [`Selector::parse`] turns a selector string into a [`selector::SelectorList`];
//! [`Selector::matches`], [`Selector::query_first`], [`Selector::query_all`],
//! and [`Selector::closest`] drive `matches()`, `querySelector()`,
//! `querySelectorAll()`, and `closest()` against a [`domcore::Node`] tree.

pub mod matching;
pub mod parser;
pub mod selector;

use domcore::error::DomResult;
use domcore::Node;

use crate::selector::SelectorList;

/// A parsed, reusable selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector(SelectorList);

impl Selector {
    /// Parse a selector string.
    ///
    /// # Errors
    /// Returns [`domcore::DomException::Syntax`] if `input` is not a valid
    /// selector list.
    pub fn parse(input: &str) -> DomResult<Self> {
        parser::parse_selector_list(input).map(Self)
    }

    /// `Element.matches(selector)`.
    #[must_use]
    pub fn matches(&self, node: &Node) -> bool {
        matching::list_matches(&self.0, node)
    }

    /// `Element.closest(selector)`.
    #[must_use]
    pub fn closest(&self, node: &Node) -> Option<Node> {
        matching::closest(&self.0, node)
    }

    /// `querySelector(selector)`, scoped to `root`'s descendants.
    #[must_use]
    pub fn query_first(&self, root: &Node) -> Option<Node> {
        matching::query_selector(&self.0, root)
    }

    /// `querySelectorAll(selector)`, scoped to `root`'s descendants.
    #[must_use]
    pub fn query_all(&self, root: &Node) -> Vec<Node> {
        matching::query_selector_all(&self.0, root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domcore::document::Document;

    #[test]
    fn parse_and_query_round_trip() {
        let doc = Document::new(None);
        let list_el = doc.create_element("ul").unwrap();
        domcore::tree::append_child(doc.node(), &list_el).unwrap();
        let item = doc.create_element("li").unwrap();
        item.set_attribute("class", "active").unwrap();
        domcore::tree::append_child(&list_el, &item).unwrap();

        let selector = Selector::parse("ul > li.active").unwrap();
        assert!(selector.matches(&item));
        assert!(selector.query_first(doc.node()).is_some());
        assert_eq!(selector.query_all(doc.node()).len(), 1);
        assert!(selector.closest(&item).is_some());
    }

    #[test]
    fn rejects_malformed_selector() {
        assert!(Selector::parse("div[").is_err());
    }
}
