//! Bit-set flags used by the node graph and traversal layers.
//!
//! Every node carries a small `flags` bit set for housekeeping state that
//! would otherwise cost a tree walk to recompute: whether it is attached
//! under a document, whether it is "connected" per WHATWG, whether any
//! inclusive ancestor has a registered `MutationObserver`, and whether the
//! owning document's ID index needs a rebuild. [`WhatToShow`] mirrors the
//! `NodeFilter` bitmask used by traversal objects.

use bitflags::bitflags;

bitflags! {
    /// Per-node housekeeping flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u8 {
        /// Set while the node is part of a document's tree (root reachable
        /// via parent chain is a `Document`).
        const IN_DOCUMENT = 0b0000_0001;
        /// Set while the node is "connected" per WHATWG (in a document,
        /// possibly via a shadow tree).
        const IS_CONNECTED = 0b0000_0010;
        /// Set when some inclusive ancestor has a registered
        /// `MutationObserver`, so mutation-record enqueueing can short
        /// circuit when unset.
        const HAS_OBSERVERS_IN_ANCESTRY = 0b0000_0100;
        /// Set on the owning document when its ID index needs a rebuild.
        const ID_CACHE_DIRTY = 0b0000_1000;
    }
}

bitflags! {
    /// [`NodeFilter`](https://dom.spec.whatwg.org/#interface-nodefilter) `whatToShow` mask.
    ///
    /// Bit `n - 1` means "show node type `n`"; the numeric node-type
    /// constants are the `DOM_*_NODE` values from the C-ABI surface.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WhatToShow: u32 {
        /// `SHOW_ELEMENT`
        const ELEMENT = 0x1;
        /// `SHOW_ATTRIBUTE`
        const ATTRIBUTE = 0x2;
        /// `SHOW_TEXT`
        const TEXT = 0x4;
        /// `SHOW_CDATA_SECTION`
        const CDATA_SECTION = 0x8;
        /// `SHOW_PROCESSING_INSTRUCTION`
        const PROCESSING_INSTRUCTION = 0x40;
        /// `SHOW_COMMENT`
        const COMMENT = 0x80;
        /// `SHOW_DOCUMENT`
        const DOCUMENT = 0x100;
        /// `SHOW_DOCUMENT_TYPE`
        const DOCUMENT_TYPE = 0x200;
        /// `SHOW_DOCUMENT_FRAGMENT`
        const DOCUMENT_FRAGMENT = 0x400;
        /// `SHOW_ALL`
        const ALL = 0xFFFF_FFFF;
    }
}
