//! Shared identifier and scope types for the vimigrate crate
//!
//! This module contains the small common types used across pipeline stages,
//! keeping the stages free of circular dependencies.

use std::hash::BuildHasherDefault;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHasher;

/// Type alias for FxHasher-based IndexMap
pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Type alias for FxHasher-based IndexSet
pub type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;

/// Unique identifier for a loaded source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);

impl FileId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Index into the project's file table
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Unique identifier for a registered function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FuncId(u32);

impl FuncId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Unique identifier for a destination file created during placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DestId(u32);

impl DestId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Visibility classification of a function
///
/// The scope decides which call sites may reach a function and whether the
/// renamer must qualify its name when it changes files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Script-local (`s:`) function, callable only from its originating file
    Private,
    /// Project-wide function, callable by bare name from anywhere
    Global,
    /// Synthetic per-file anchor for code outside any named function
    TopLevel,
}

impl Scope {
    /// Check if this is a script-local function
    pub fn is_private(self) -> bool {
        matches!(self, Scope::Private)
    }

    /// Check if this is a project-wide function
    pub fn is_global(self) -> bool {
        matches!(self, Scope::Global)
    }

    /// Check if this is the synthetic top-level anchor
    pub fn is_top_level(self) -> bool {
        matches!(self, Scope::TopLevel)
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Private => write!(f, "private"),
            Scope::Global => write!(f, "global"),
            Scope::TopLevel => write!(f, "top-level"),
        }
    }
}
