//! Shared-ownership document wrapper (spec §9 "Reference counting on
//! the wrapper"). The reference source hand-rolls a refcount so cloned
//! handles share one parser and token buffer; here that is just `Rc`.

use std::rc::Rc;

use crate::compare::{self, CompareMode, CompareOutcome};
use crate::config::Config;
use crate::error::Result;
use crate::navigator::{self, Iter};
use crate::parser;
use crate::serializer::{self, Indent};
use crate::token::Token;

#[derive(Debug)]
struct Inner {
    src: Vec<u8>,
    tokens: Vec<Token>,
    root: u32,
}

/// A parsed document plus its source buffer, sharable by cheap clone.
/// All navigation/serialization methods on [`Document`] are read-only,
/// matching the "source buffer and token array are read-only-after-parse"
/// resource policy of spec §5.
#[derive(Debug, Clone)]
pub struct Document {
    inner: Rc<Inner>,
}

impl Document {
    /// Parses `src` with `cfg` and wraps the result. The source bytes
    /// are copied in so the document owns its own lifetime.
    pub fn parse(src: &[u8], cfg: &Config) -> Result<Document> {
        let owned = src.to_vec();
        let mut tokens = Vec::new();
        parser::parse_into(&mut tokens, &owned, cfg, None)?;
        Ok(Document {
            inner: Rc::new(Inner { src: owned, tokens, root: 0 }),
        })
    }

    /// Rebuilds a document from a packed blob (spec §4.6 "Binary unpack").
    pub fn from_packed(blob: &[u8]) -> Result<Document> {
        let (src, tokens) = crate::binary::unpack(blob)?;
        Ok(Document {
            inner: Rc::new(Inner { src, tokens, root: 0 }),
        })
    }

    pub fn src(&self) -> &[u8] {
        &self.inner.src
    }

    pub fn tokens(&self) -> &[Token] {
        &self.inner.tokens
    }

    pub fn root(&self) -> u32 {
        self.inner.root
    }

    pub fn iter(&self) -> Iter {
        navigator::iter_begin(&self.inner.tokens, self.inner.root)
    }

    pub fn find_key(&self, key: &[u8]) -> Iter {
        navigator::find_key(&self.inner.tokens, &self.inner.src, self.inner.root, key)
    }

    pub fn find_index(&self, index: u32) -> Iter {
        navigator::find_index(&self.inner.tokens, self.inner.root, index)
    }

    pub fn members(&self) -> u32 {
        navigator::members(&self.inner.tokens, self.inner.root)
    }

    pub fn compare(&self, other: &Document, mode: CompareMode) -> CompareOutcome {
        compare::compare(
            &self.inner.tokens,
            &self.inner.src,
            self.inner.root,
            &other.inner.tokens,
            &other.inner.src,
            other.inner.root,
            mode,
        )
    }

    pub fn to_vec_with_indent(&self, indent: Indent) -> Vec<u8> {
        serializer::to_vec(&self.inner.tokens, &self.inner.src, self.inner.root, indent)
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.to_vec_with_indent(Indent::NONE)
    }

    pub fn pack(&self) -> Vec<u8> {
        crate::binary::pack(&self.inner.tokens, &self.inner.src)
    }

    /// Number of strong handles sharing this document's storage.
    pub fn share_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }
}
