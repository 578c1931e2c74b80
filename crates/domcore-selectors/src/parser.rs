//! A selector-string parser.
//!
//! Accepts the subset of [Selectors Level 4](https://www.w3.org/TR/selectors-4/)
//! grammar this engine models: type/universal/class/id/attribute selectors,
//! the structural and negation/matches pseudo-classes in [`PseudoClass`],
//! and the four combinators. Pseudo-elements, unknown pseudo-classes, and
//! malformed input are all rejected with [`DomException::Syntax`] rather
//! than silently compiling to a selector that never matches.

use std::iter::Peekable;
use std::str::CharIndices;

use domcore::error::{DomException, DomResult};

use crate::selector::{
    specificity_of_complex, AttributeSelector, Combinator, CompoundSelector, ComplexSelector,
    NthExpr, ParsedSelector, PseudoClass, SelectorList, SimpleSelector,
};

struct Parser<'a> {
    chars: Peekable<CharIndices<'a>>,
}

/// Parse a comma-separated selector list.
///
/// # Errors
/// Returns [`DomException::Syntax`] if `input` does not parse as a valid
/// selector list.
pub fn parse_selector_list(input: &str) -> DomResult<SelectorList> {
    let mut parser = Parser { chars: input.char_indices().peekable() };
    let list = parser.parse_selector_list()?;
    parser.skip_whitespace();
    if parser.chars.peek().is_some() {
        return Err(DomException::Syntax(format!("unexpected trailing input in {input:?}")));
    }
    Ok(list)
}

impl<'a> Parser<'a> {
    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn parse_selector_list(&mut self) -> DomResult<SelectorList> {
        let mut selectors = vec![self.parse_complex_selector()?];
        loop {
            self.skip_whitespace();
            if self.peek_char() == Some(',') {
                self.chars.next();
                self.skip_whitespace();
                selectors.push(self.parse_complex_selector()?);
            } else {
                break;
            }
        }
        Ok(SelectorList { selectors })
    }

    fn parse_complex_selector(&mut self) -> DomResult<ParsedSelector> {
        let mut combinators = Vec::new();
        let mut subjects = vec![self.parse_compound_selector()?];
        loop {
            let had_space = matches!(self.peek_char(), Some(c) if c.is_whitespace());
            self.skip_whitespace();
            let combinator = match self.peek_char() {
                Some('>') => {
                    self.chars.next();
                    self.skip_whitespace();
                    Some(Combinator::Child)
                }
                Some('+') => {
                    self.chars.next();
                    self.skip_whitespace();
                    Some(Combinator::NextSibling)
                }
                Some('~') => {
                    self.chars.next();
                    self.skip_whitespace();
                    Some(Combinator::SubsequentSibling)
                }
                Some(c) if c != ',' && c != ')' => {
                    if had_space {
                        Some(Combinator::Descendant)
                    } else {
                        None
                    }
                }
                _ => None,
            };
            let Some(combinator) = combinator else { break };
            subjects.push(self.parse_compound_selector()?);
            combinators.push(combinator);
        }

        // subjects[0] is the leftmost ancestor; the selector model walks
        // right-to-left from the subject, so reverse into that order.
        let mut subjects = subjects;
        let subject = subjects.pop().expect("at least one compound selector");
        let mut pairs = Vec::with_capacity(combinators.len());
        while let Some(compound) = subjects.pop() {
            let combinator = combinators.pop().expect("one combinator per left compound");
            pairs.push((combinator, compound));
        }

        let complex = ComplexSelector { subject, combinators: pairs };
        let specificity = specificity_of_complex(&complex);
        Ok(ParsedSelector { complex, specificity })
    }

    fn parse_compound_selector(&mut self) -> DomResult<CompoundSelector> {
        let mut simple_selectors = Vec::new();
        loop {
            match self.peek_char() {
                Some('*') => {
                    self.chars.next();
                    simple_selectors.push(SimpleSelector::Universal);
                }
                Some('.') => {
                    self.chars.next();
                    let name = self.parse_ident()?;
                    simple_selectors.push(SimpleSelector::Class(name));
                }
                Some('#') => {
                    self.chars.next();
                    let name = self.parse_ident()?;
                    simple_selectors.push(SimpleSelector::Id(name));
                }
                Some('[') => {
                    simple_selectors.push(SimpleSelector::Attribute(self.parse_attribute_selector()?));
                }
                Some(':') => {
                    simple_selectors.push(self.parse_pseudo()?);
                }
                Some(c) if is_ident_start(c) => {
                    let name = self.parse_ident()?;
                    simple_selectors.push(SimpleSelector::Type(name));
                }
                _ => break,
            }
        }
        if simple_selectors.is_empty() {
            return Err(DomException::Syntax("expected a compound selector".to_string()));
        }
        Ok(CompoundSelector { simple_selectors })
    }

    fn parse_ident(&mut self) -> DomResult<String> {
        let mut out = String::new();
        while let Some(c) = self.peek_char() {
            if is_ident_char(c) {
                out.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if out.is_empty() {
            return Err(DomException::Syntax("expected an identifier".to_string()));
        }
        Ok(out)
    }

    fn parse_attribute_selector(&mut self) -> DomResult<AttributeSelector> {
        self.chars.next(); // '['
        self.skip_whitespace();
        let name = self.parse_ident()?;
        self.skip_whitespace();
        let op = match self.peek_char() {
            Some(']') => {
                self.chars.next();
                return Ok(AttributeSelector::Exists(name));
            }
            Some('=') => {
                self.chars.next();
                "="
            }
            Some('~') => { self.chars.next(); self.expect('=')?; "~=" }
            Some('|') => { self.chars.next(); self.expect('=')?; "|=" }
            Some('^') => { self.chars.next(); self.expect('=')?; "^=" }
            Some('$') => { self.chars.next(); self.expect('=')?; "$=" }
            Some('*') => { self.chars.next(); self.expect('=')?; "*=" }
            _ => return Err(DomException::Syntax("malformed attribute selector".to_string())),
        };
        self.skip_whitespace();
        let value = self.parse_attribute_value()?;
        self.skip_whitespace();
        // Case-sensitivity flag (`i`/`s`) is accepted but ignored; this
        // engine always matches attribute values case-sensitively.
        if matches!(self.peek_char(), Some('i' | 's' | 'I' | 'S')) {
            self.chars.next();
            self.skip_whitespace();
        }
        if self.peek_char() != Some(']') {
            return Err(DomException::Syntax("expected ']'".to_string()));
        }
        self.chars.next();
        Ok(match op {
            "=" => AttributeSelector::Equals(name, value),
            "~=" => AttributeSelector::Includes(name, value),
            "|=" => AttributeSelector::DashMatch(name, value),
            "^=" => AttributeSelector::PrefixMatch(name, value),
            "$=" => AttributeSelector::SuffixMatch(name, value),
            "*=" => AttributeSelector::SubstringMatch(name, value),
            _ => unreachable!("operator set matches the match arms above"),
        })
    }

    fn expect(&mut self, expected: char) -> DomResult<()> {
        if self.peek_char() == Some(expected) {
            self.chars.next();
            Ok(())
        } else {
            Err(DomException::Syntax(format!("expected '{expected}'")))
        }
    }

    fn parse_attribute_value(&mut self) -> DomResult<String> {
        match self.peek_char() {
            Some(q @ ('"' | '\'')) => {
                self.chars.next();
                let mut out = String::new();
                loop {
                    match self.chars.next() {
                        Some((_, c)) if c == q => break,
                        Some((_, c)) => out.push(c),
                        None => return Err(DomException::Syntax("unterminated attribute value".to_string())),
                    }
                }
                Ok(out)
            }
            _ => self.parse_ident(),
        }
    }

    fn parse_pseudo(&mut self) -> DomResult<SimpleSelector> {
        self.chars.next(); // ':'
        if self.peek_char() == Some(':') {
            self.chars.next();
            let name = self.parse_ident()?;
            return Err(DomException::Syntax(format!("pseudo-element ::{name} is not supported")));
        }
        let name = self.parse_ident()?;
        if self.peek_char() == Some('(') {
            self.chars.next();
            self.skip_whitespace();
            let selector = self.parse_pseudo_function(&name)?;
            self.skip_whitespace();
            if self.peek_char() != Some(')') {
                return Err(DomException::Syntax(format!(":{name}() is missing a closing parenthesis")));
            }
            self.chars.next();
            return Ok(selector);
        }
        Ok(match name.as_str() {
            "root" => SimpleSelector::PseudoClass(PseudoClass::Root),
            "first-child" => SimpleSelector::PseudoClass(PseudoClass::FirstChild),
            "last-child" => SimpleSelector::PseudoClass(PseudoClass::LastChild),
            "only-child" => SimpleSelector::PseudoClass(PseudoClass::OnlyChild),
            "first-of-type" => SimpleSelector::PseudoClass(PseudoClass::FirstOfType),
            "last-of-type" => SimpleSelector::PseudoClass(PseudoClass::LastOfType),
            "only-of-type" => SimpleSelector::PseudoClass(PseudoClass::OnlyOfType),
            "empty" => SimpleSelector::PseudoClass(PseudoClass::Empty),
            _ => return Err(DomException::Syntax(format!("unknown pseudo-class :{name}"))),
        })
    }

    fn parse_pseudo_function(&mut self, name: &str) -> DomResult<SimpleSelector> {
        match name {
            "not" => {
                let inner = self.parse_selector_list()?;
                Ok(SimpleSelector::PseudoClass(PseudoClass::Not(Box::new(inner))))
            }
            "is" | "where" | "matches" => {
                let inner = self.parse_selector_list()?;
                Ok(SimpleSelector::PseudoClass(PseudoClass::Is(Box::new(inner))))
            }
            "nth-child" | "nth-of-type" => {
                let expr = self.parse_nth()?;
                Ok(SimpleSelector::PseudoClass(if name == "nth-child" {
                    PseudoClass::NthChild(expr)
                } else {
                    PseudoClass::NthOfType(expr)
                }))
            }
            _ => Err(DomException::Syntax(format!("unknown functional pseudo-class :{name}()"))),
        }
    }

    /// Parse an `An+B` micro-syntax directly off the character stream,
    /// stopping before the closing `)`.
    fn parse_nth(&mut self) -> DomResult<NthExpr> {
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if c == ')' {
                break;
            }
            text.push(c);
            self.chars.next();
        }
        parse_nth_expr(text.trim())
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

/// Parse an `An+B` micro-syntax, e.g. `2n+1`, `odd`, `even`, `-n+3`, `5`.
fn parse_nth_expr(text: &str) -> DomResult<NthExpr> {
    let normalized: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    match normalized.as_str() {
        "odd" => return Ok(NthExpr { a: 2, b: 1 }),
        "even" => return Ok(NthExpr { a: 2, b: 0 }),
        _ => {}
    }
    let Some(n_pos) = normalized.find(['n', 'N']) else {
        let b: i32 = normalized
            .parse()
            .map_err(|_| DomException::Syntax(format!("invalid nth expression {text:?}")))?;
        return Ok(NthExpr { a: 0, b });
    };
    let a_part = &normalized[..n_pos];
    let a = match a_part {
        "" | "+" => 1,
        "-" => -1,
        _ => a_part
            .parse()
            .map_err(|_| DomException::Syntax(format!("invalid nth expression {text:?}")))?,
    };
    let b_part = normalized[n_pos + 1..].trim();
    let b = if b_part.is_empty() {
        0
    } else {
        b_part
            .parse()
            .map_err(|_| DomException::Syntax(format!("invalid nth expression {text:?}")))?
    };
    Ok(NthExpr { a, b })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_compound_selector() {
        let list = parse_selector_list("div.card#main").unwrap();
        assert_eq!(list.selectors.len(), 1);
        let simple = &list.selectors[0].complex.subject.simple_selectors;
        assert_eq!(simple.len(), 3);
    }

    #[test]
    fn parses_descendant_and_child_combinators() {
        let list = parse_selector_list("ul > li .label").unwrap();
        let complex = &list.selectors[0].complex;
        assert_eq!(complex.combinators.len(), 2);
        assert_eq!(complex.combinators[0].0, Combinator::Child);
        assert_eq!(complex.combinators[1].0, Combinator::Descendant);
    }

    #[test]
    fn parses_attribute_selector_with_quoted_value() {
        let list = parse_selector_list("input[type=\"checkbox\"]").unwrap();
        let simple = &list.selectors[0].complex.subject.simple_selectors;
        assert!(matches!(
            &simple[1],
            SimpleSelector::Attribute(AttributeSelector::Equals(name, value))
                if name == "type" && value == "checkbox"
        ));
    }

    #[test]
    fn parses_nth_child_expression() {
        let list = parse_selector_list(":nth-child(2n+1)").unwrap();
        let simple = &list.selectors[0].complex.subject.simple_selectors;
        assert!(matches!(
            &simple[0],
            SimpleSelector::PseudoClass(PseudoClass::NthChild(NthExpr { a: 2, b: 1 }))
        ));
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(parse_selector_list("div)").is_err());
    }

    #[test]
    fn rejects_unknown_pseudo_class() {
        match parse_selector_list("a:hover") {
            Err(DomException::Syntax(_)) => {}
            other => panic!("expected Syntax error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_functional_pseudo_class() {
        match parse_selector_list("a:lang(en)") {
            Err(DomException::Syntax(_)) => {}
            other => panic!("expected Syntax error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_pseudo_elements() {
        match parse_selector_list("p::before") {
            Err(DomException::Syntax(_)) => {}
            other => panic!("expected Syntax error, got {other:?}"),
        }
    }
}
