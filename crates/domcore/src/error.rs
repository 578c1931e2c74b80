//! DOM exception taxonomy.
//!
//! [§ 4.3 DOMException interface](https://webidl.spec.whatwg.org/#idl-DOMException)
//!
//! The engine never models a "half-applied" mutation: every fallible
//! operation validates before it touches the tree, refcount graph, or
//! observer queues, and returns one of these variants instead.

use thiserror::Error;

/// Result alias used throughout the engine.
pub type DomResult<T> = Result<T, DomException>;

/// The abstract error kinds named by the specification, not the DOM's own
/// named exception strings (`HierarchyRequestError` etc.) but close enough
/// to map 1:1 onto them and onto the fixed `DOM_ERROR_*` code table at the
/// C-ABI boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomException {
    /// Insertion would violate a hierarchy invariant: a cycle, the wrong
    /// node kind under a `Document`, or doctype misplacement.
    #[error("hierarchy request error: {0}")]
    HierarchyRequest(String),

    /// The referenced node is not where the caller claims.
    #[error("not found: {0}")]
    NotFound(String),

    /// A name violates XML `NameStartChar`/`NameChar`.
    #[error("invalid character in name {0:?}")]
    InvalidCharacter(String),

    /// The operation is disallowed in the engine's current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A selector or namespace declaration is malformed.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// A qualified name is inconsistent with its namespace URI.
    #[error("namespace error: {0}")]
    Namespace(String),

    /// A resource quota from the document's `DocumentConfig` would be
    /// exceeded by this operation.
    #[error("quota exceeded: {quota} (limit {limit})")]
    QuotaExceeded {
        /// Name of the quota that was hit, e.g. `"max_tree_depth"`.
        quota: &'static str,
        /// The configured limit.
        limit: usize,
    },

    /// The operation requires all arguments to belong to the same document.
    #[error("wrong document: {0}")]
    WrongDocument(String),
}
