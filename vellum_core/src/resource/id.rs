// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resource and container identity types.

use core::fmt;

use smol_str::SmolStr;

/// The document-level name of a resource definition, as written in a
/// `url(#id)` reference or an `id` attribute.
///
/// Ids are expected to be unique within a document, but duplicates are
/// tolerated: the newest registration wins (see
/// [`ResourceRegistry::register`](super::ResourceRegistry::register)).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(SmolStr);

impl ResourceId {
    /// Creates an id from a string slice.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(SmolStr::new(id))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns `true` for the empty id, which never resolves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceId({:?})", self.0.as_str())
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A handle to a live [`ResourceContainer`](super::ResourceContainer).
///
/// Bundles and registry entries hold this handle instead of the container.
/// Destroying a container bumps its slot's generation, so a handle that
/// outlived its container fails validation instead of reading a recycled slot.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContainerId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl ContainerId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContainerId({}@gen{})", self.idx, self.generation)
    }
}
