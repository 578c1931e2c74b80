//! Matching a parsed selector against a live [`domcore::Node`].

use domcore::Node;

use crate::selector::{
    AttributeSelector, Combinator, CompoundSelector, ComplexSelector, NthExpr, ParsedSelector,
    PseudoClass, SelectorList, SimpleSelector,
};

/// Whether `node` matches any selector in `list`.
#[must_use]
pub fn list_matches(list: &SelectorList, node: &Node) -> bool {
    list.selectors.iter().any(|s| complex_matches(&s.complex, node))
}

/// Whether `node` matches `selector`, including its combinator chain.
#[must_use]
pub fn selector_matches(selector: &ParsedSelector, node: &Node) -> bool {
    complex_matches(&selector.complex, node)
}

fn complex_matches(complex: &ComplexSelector, node: &Node) -> bool {
    if node.node_type() != domcore::node::ELEMENT_NODE {
        return false;
    }
    if !compound_matches(&complex.subject, node) {
        return false;
    }
    matches_combinators(&complex.combinators, node)
}

/// Walk the combinator chain right-to-left, trying each candidate ancestor
/// or sibling in turn. `combinators` is in right-to-left order (closest to
/// the subject first), matching [`crate::selector::ComplexSelector`]'s
/// storage order.
fn matches_combinators(combinators: &[(Combinator, CompoundSelector)], subject: &Node) -> bool {
    let Some(((combinator, compound), rest)) = combinators.split_first() else {
        return true;
    };
    match combinator {
        Combinator::Child => match subject.parent() {
            Some(parent) if compound_matches(compound, &parent) => matches_combinators(rest, &parent),
            _ => false,
        },
        Combinator::Descendant => {
            let mut current = subject.parent();
            while let Some(ancestor) = current {
                if compound_matches(compound, &ancestor) && matches_combinators(rest, &ancestor) {
                    return true;
                }
                current = ancestor.parent();
            }
            false
        }
        Combinator::NextSibling => match previous_element_sibling(subject) {
            Some(sibling) if compound_matches(compound, &sibling) => matches_combinators(rest, &sibling),
            _ => false,
        },
        Combinator::SubsequentSibling => {
            let mut current = previous_element_sibling(subject);
            while let Some(sibling) = current {
                if compound_matches(compound, &sibling) && matches_combinators(rest, &sibling) {
                    return true;
                }
                current = previous_element_sibling(&sibling);
            }
            false
        }
    }
}

fn previous_element_sibling(node: &Node) -> Option<Node> {
    let mut sibling = node.previous_sibling();
    while let Some(s) = sibling {
        if s.node_type() == domcore::node::ELEMENT_NODE {
            return Some(s);
        }
        sibling = s.previous_sibling();
    }
    None
}

fn next_element_sibling(node: &Node) -> Option<Node> {
    let mut sibling = node.next_sibling();
    while let Some(s) = sibling {
        if s.node_type() == domcore::node::ELEMENT_NODE {
            return Some(s);
        }
        sibling = s.next_sibling();
    }
    None
}

fn compound_matches(compound: &CompoundSelector, node: &Node) -> bool {
    compound.simple_selectors.iter().all(|s| simple_matches(s, node))
}

fn simple_matches(simple: &SimpleSelector, node: &Node) -> bool {
    match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(name) => node.local_name().is_some_and(|n| n.as_str() == name),
        SimpleSelector::Class(class) => {
            // The bloom filter can only prove absence; a hit still needs
            // the real scan below to rule out a false positive.
            node.class_might_contain(class)
                && node
                    .get_attribute("class")
                    .is_some_and(|value| value.split_ascii_whitespace().any(|token| token == class))
        }
        SimpleSelector::Id(id) => node.get_attribute("id").as_deref() == Some(id.as_str()),
        SimpleSelector::Attribute(attr) => attribute_matches(attr, node),
        SimpleSelector::PseudoClass(pseudo) => pseudo_matches(pseudo, node),
    }
}

fn attribute_matches(attr: &AttributeSelector, node: &Node) -> bool {
    match attr {
        AttributeSelector::Exists(name) => node.has_attribute(name),
        AttributeSelector::Equals(name, value) => node.get_attribute(name).as_deref() == Some(value.as_str()),
        AttributeSelector::Includes(name, value) => node
            .get_attribute(name)
            .is_some_and(|v| v.split_ascii_whitespace().any(|token| token == value)),
        AttributeSelector::DashMatch(name, value) => node.get_attribute(name).is_some_and(|v| {
            v == *value || v.strip_prefix(&format!("{value}-")).is_some()
        }),
        AttributeSelector::PrefixMatch(name, value) => {
            !value.is_empty() && node.get_attribute(name).is_some_and(|v| v.starts_with(value.as_str()))
        }
        AttributeSelector::SuffixMatch(name, value) => {
            !value.is_empty() && node.get_attribute(name).is_some_and(|v| v.ends_with(value.as_str()))
        }
        AttributeSelector::SubstringMatch(name, value) => {
            !value.is_empty() && node.get_attribute(name).is_some_and(|v| v.contains(value.as_str()))
        }
    }
}

fn pseudo_matches(pseudo: &PseudoClass, node: &Node) -> bool {
    match pseudo {
        PseudoClass::Root => node.parent().is_some_and(|p| p.node_type() == domcore::node::DOCUMENT_NODE),
        PseudoClass::FirstChild => previous_element_sibling(node).is_none(),
        PseudoClass::LastChild => next_element_sibling(node).is_none(),
        PseudoClass::OnlyChild => previous_element_sibling(node).is_none() && next_element_sibling(node).is_none(),
        PseudoClass::FirstOfType => element_siblings_of_same_type(node).next().is_none(),
        PseudoClass::LastOfType => element_siblings_of_same_type_after(node).next().is_none(),
        PseudoClass::OnlyOfType => {
            element_siblings_of_same_type(node).next().is_none()
                && element_siblings_of_same_type_after(node).next().is_none()
        }
        PseudoClass::Empty => node.children().next().is_none(),
        PseudoClass::Not(list) => !list_matches(list, node),
        PseudoClass::Is(list) => list_matches(list, node),
        PseudoClass::NthChild(expr) => nth_matches(expr, node, false),
        PseudoClass::NthOfType(expr) => nth_matches(expr, node, true),
    }
}

/// Earlier element siblings sharing `node`'s local name.
fn element_siblings_of_same_type(node: &Node) -> impl Iterator<Item = Node> + '_ {
    std::iter::successors(previous_element_sibling(node), previous_element_sibling)
        .filter(move |s| s.local_name() == node.local_name())
}

/// Later element siblings sharing `node`'s local name.
fn element_siblings_of_same_type_after(node: &Node) -> impl Iterator<Item = Node> + '_ {
    std::iter::successors(next_element_sibling(node), next_element_sibling)
        .filter(move |s| s.local_name() == node.local_name())
}

fn nth_matches(expr: &NthExpr, node: &Node, same_type_only: bool) -> bool {
    let mut index = 1i32;
    let mut sibling = previous_element_sibling(node);
    while let Some(s) = sibling {
        if !same_type_only || s.local_name() == node.local_name() {
            index += 1;
        }
        sibling = previous_element_sibling(&s);
    }
    expr.matches(index)
}

/// `closest(selector)`: the nearest inclusive ancestor matching `list`.
#[must_use]
pub fn closest(list: &SelectorList, node: &Node) -> Option<Node> {
    node.inclusive_ancestors().find(|n| list_matches(list, n))
}

/// `querySelector(selector)`: the first descendant (in tree order)
/// matching `list`.
#[must_use]
pub fn query_selector(list: &SelectorList, root: &Node) -> Option<Node> {
    root.tree_order_descendants().find(|n| list_matches(list, n))
}

/// `querySelectorAll(selector)`: every descendant (in tree order) matching
/// `list`.
#[must_use]
pub fn query_selector_all(list: &SelectorList, root: &Node) -> Vec<Node> {
    root.tree_order_descendants().filter(|n| list_matches(list, n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_selector_list;
    use domcore::document::Document;

    fn build_tree() -> (Document, Node, Node, Node) {
        let doc = Document::new(None);
        let root = doc.create_element("div").unwrap();
        domcore::tree::append_child(doc.node(), &root).unwrap();
        root.set_attribute("id", "main").unwrap();
        root.set_attribute("class", "panel card").unwrap();
        let child_a = doc.create_element("span").unwrap();
        let child_b = doc.create_element("p").unwrap();
        domcore::tree::append_child(&root, &child_a).unwrap();
        domcore::tree::append_child(&root, &child_b).unwrap();
        (doc, root, child_a, child_b)
    }

    #[test]
    fn matches_id_and_class() {
        let (_doc, root, _a, _b) = build_tree();
        let list = parse_selector_list("#main.card").unwrap();
        assert!(list_matches(&list, &root));
        let wrong = parse_selector_list("#main.missing").unwrap();
        assert!(!list_matches(&wrong, &root));
    }

    #[test]
    fn child_combinator_requires_direct_parent() {
        let (_doc, root, child_a, _b) = build_tree();
        let list = parse_selector_list("div > span").unwrap();
        assert!(list_matches(&list, &child_a));
        let _ = root;
    }

    #[test]
    fn first_and_last_child_pseudo_classes() {
        let (_doc, _root, child_a, child_b) = build_tree();
        let first = parse_selector_list("span:first-child").unwrap();
        let last = parse_selector_list("p:last-child").unwrap();
        assert!(list_matches(&first, &child_a));
        assert!(list_matches(&last, &child_b));
    }

    #[test]
    fn query_selector_all_walks_tree_order() {
        let (doc, _root, child_a, child_b) = build_tree();
        let list = parse_selector_list("*").unwrap();
        let found = query_selector_all(&list, doc.node());
        assert!(found.iter().any(|n| n.ptr_eq(&child_a)));
        assert!(found.iter().any(|n| n.ptr_eq(&child_b)));
    }

    #[test]
    fn not_pseudo_class_excludes_matches() {
        let (_doc, root, _a, _b) = build_tree();
        let list = parse_selector_list("div:not(.missing)").unwrap();
        assert!(list_matches(&list, &root));
        let excluding = parse_selector_list("div:not(.card)").unwrap();
        assert!(!list_matches(&excluding, &root));
    }
}
