//! Atom tree store for structured math expressions.
//!
//! An expression is a tree of [`Atom`]s held in an [`AtomTree`] arena. Each
//! atom owns named child lists ([`Branch`]es); array atoms additionally map
//! `(column, row)` pairs onto cell branches (see [`array`]).

use smartstring::{
  LazyCompact,
  SmartString,
};

pub mod array;
pub mod atom;
pub mod branch;
pub mod chars;
pub mod tree;

pub use array::{
  ArrayShape,
  ColRow,
};
pub use atom::{
  Atom,
  AtomKind,
  RenderMode,
  Style,
};
pub use branch::{
  BRANCH_ORDER,
  Branch,
};
pub use tree::{
  AtomTree,
  TreeError,
};

pub type Tendril = SmartString<LazyCompact>;

slotmap::new_key_type! {
  /// Stable identity of an atom inside its [`AtomTree`].
  pub struct AtomId;
}
