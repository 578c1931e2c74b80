//! `DOMTokenList`, the ordered-set-of-unique-tokens view over an
//! attribute value (`classList`, `relList`, ...).
//!
//! [`DOMTokenList`](https://dom.spec.whatwg.org/#interface-domtokenlist)

use crate::error::{DomException, DomResult};
use crate::node::Node;

/// A live view over one attribute's value, split on ASCII whitespace.
pub struct TokenList {
    element: Node,
    attribute: String,
}

fn is_ascii_whitespace(c: char) -> bool {
    matches!(c, '\u{9}' | '\u{A}' | '\u{C}' | '\u{D}' | '\u{20}')
}

fn validate_token(token: &str) -> DomResult<()> {
    if token.is_empty() {
        return Err(DomException::Syntax("token must not be empty".to_string()));
    }
    if token.chars().any(is_ascii_whitespace) {
        return Err(DomException::InvalidCharacter(
            "token must not contain ASCII whitespace".to_string(),
        ));
    }
    Ok(())
}

impl TokenList {
    /// Bind a token list to `attribute` on `element`. Does not require
    /// the attribute to already exist.
    #[must_use]
    pub fn new(element: Node, attribute: impl Into<String>) -> Self {
        Self { element, attribute: attribute.into() }
    }

    fn tokens(&self) -> Vec<String> {
        self.element
            .get_attribute(&self.attribute)
            .map(|v| {
                v.split(is_ascii_whitespace)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn set_tokens(&self, tokens: &[String]) {
        // set_attribute only fails on an invalid attribute name; "class"
        // (and every other token-list-backed attribute name) is always
        // valid, so the error case cannot occur here.
        let _ = self.element.set_attribute(&self.attribute, &tokens.join(" "));
    }

    /// Number of tokens.
    #[must_use]
    pub fn length(&self) -> usize {
        self.tokens().len()
    }

    /// `item(index)`.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<String> {
        self.tokens().into_iter().nth(index)
    }

    /// `contains(token)`.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens().iter().any(|t| t == token)
    }

    /// `add(tokens...)`.
    pub fn add(&self, new_tokens: &[&str]) -> DomResult<()> {
        for t in new_tokens {
            validate_token(t)?;
        }
        let mut tokens = self.tokens();
        for t in new_tokens {
            if !tokens.iter().any(|existing| existing == t) {
                tokens.push((*t).to_string());
            }
        }
        self.set_tokens(&tokens);
        Ok(())
    }

    /// `remove(tokens...)`.
    pub fn remove(&self, remove_tokens: &[&str]) -> DomResult<()> {
        for t in remove_tokens {
            validate_token(t)?;
        }
        let tokens: Vec<String> = self
            .tokens()
            .into_iter()
            .filter(|t| !remove_tokens.contains(&t.as_str()))
            .collect();
        self.set_tokens(&tokens);
        Ok(())
    }

    /// `toggle(token, force)`. Returns whether the token is present after
    /// the call.
    pub fn toggle(&self, token: &str, force: Option<bool>) -> DomResult<bool> {
        validate_token(token)?;
        let present = self.contains(token);
        let want = force.unwrap_or(!present);
        if want && !present {
            self.add(&[token])?;
        } else if !want && present {
            self.remove(&[token])?;
        }
        Ok(want)
    }

    /// `replace(old, new)`. Returns whether the replacement happened.
    pub fn replace(&self, old: &str, new: &str) -> DomResult<bool> {
        validate_token(old)?;
        validate_token(new)?;
        let mut tokens = self.tokens();
        let Some(pos) = tokens.iter().position(|t| t == old) else {
            return Ok(false);
        };
        if tokens.iter().any(|t| t == new) {
            tokens.remove(pos);
        } else {
            tokens[pos] = new.to_string();
        }
        self.set_tokens(&tokens);
        Ok(true)
    }

    /// `value` — the raw, unsplit attribute text.
    #[must_use]
    pub fn value(&self) -> String {
        self.element.get_attribute(&self.attribute).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn add_dedupes_and_preserves_order() {
        let doc = Document::new(None);
        let el = doc.create_element("div").unwrap();
        let classes = TokenList::new(el, "class");
        classes.add(&["a", "b", "a"]).unwrap();
        assert_eq!(classes.value(), "a b");
        assert_eq!(classes.length(), 2);
    }

    #[test]
    fn toggle_flips_presence() {
        let doc = Document::new(None);
        let el = doc.create_element("div").unwrap();
        let classes = TokenList::new(el, "class");
        assert!(classes.toggle("hidden", None).unwrap());
        assert!(classes.contains("hidden"));
        assert!(!classes.toggle("hidden", None).unwrap());
        assert!(!classes.contains("hidden"));
    }

    #[test]
    fn add_rejects_token_with_whitespace() {
        let doc = Document::new(None);
        let el = doc.create_element("div").unwrap();
        let classes = TokenList::new(el, "class");
        assert!(classes.add(&["has space"]).is_err());
    }
}
