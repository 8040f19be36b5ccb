//! Arena that owns every atom of an expression.
//!
//! Atoms refer to their children by [`AtomId`]; the arena is the single
//! owner. Every branch list starts with a [`AtomKind::First`] sentinel so
//! that offset 0 is addressable even when the branch holds nothing else.
//! The helpers on [`AtomTree`] keep that invariant: callers insert and
//! remove real content at offsets `>= 1` and never see the sentinel move.
//!
//! ```
//! use the_atom::{AtomKind, AtomTree, Branch};
//!
//! let mut tree = AtomTree::new();
//! let x = tree.symbol(AtomKind::Ordinary, "x");
//! let two = tree.symbol(AtomKind::Ordinary, "2");
//! let fraction = tree.fraction(vec![], vec![two]);
//! tree.append_root(vec![x, fraction]);
//!
//! assert_eq!(tree.children(tree.root(), Branch::Body).unwrap().len(), 3);
//! assert!(tree.validate().is_ok());
//! ```

use std::{
  collections::HashSet,
  ops::Range,
};

use slotmap::HopSlotMap;
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
  AtomId,
  Tendril,
  array::{
    ArrayShape,
    array_cell_count,
  },
  atom::{
    Atom,
    AtomKind,
    RenderMode,
  },
  branch::Branch,
};

/// Value given to placeholders created by the tree builders.
pub const DEFAULT_PLACEHOLDER: &str = "\u{2B1A}";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TreeError {
  #[error("atom {0:?} is not part of the tree")]
  UnknownAtom(AtomId),
  #[error("atom {atom:?} has no {branch} branch")]
  MissingBranch { atom: AtomId, branch: Branch },
  #[error("branch {branch} of atom {atom:?} does not start with a sentinel")]
  MissingSentinel { atom: AtomId, branch: Branch },
  #[error("sentinel {0:?} must not own branches")]
  SentinelWithBranches(AtomId),
  #[error("atom {0:?} is reachable from more than one branch")]
  SharedAtom(AtomId),
  #[error("atom {0:?} is already part of a branch")]
  AttachedAtom(AtomId),
  #[error("cell branch {branch} does not fit atom {atom:?}")]
  InvalidCell { atom: AtomId, branch: Branch },
  #[error("range {start}..{end} is not removable from a branch of length {len}")]
  InvalidRange { start: usize, end: usize, len: usize },
  #[error("offset {offset} is out of range for a branch of length {len}")]
  OffsetOutOfRange { offset: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, TreeError>;

#[derive(Debug, Clone)]
pub struct AtomTree {
  atoms: HopSlotMap<AtomId, Atom>,
  root:  AtomId,
}

impl Default for AtomTree {
  fn default() -> Self {
    Self::new()
  }
}

impl AtomTree {
  /// A tree whose root body holds only the sentinel.
  pub fn new() -> Self {
    let mut atoms = HopSlotMap::with_key();
    let root = atoms.insert(Atom::math(AtomKind::Root, ""));
    let mut tree = Self { atoms, root };
    tree.push_branch(root, Branch::Body, Vec::new());
    tree
  }

  #[inline]
  pub fn root(&self) -> AtomId {
    self.root
  }

  #[inline]
  pub fn get(&self, id: AtomId) -> Option<&Atom> {
    self.atoms.get(id)
  }

  /// Mutable access to an atom's value, flags and style. Structure is only
  /// changed through the tree helpers.
  #[inline]
  pub fn get_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
    self.atoms.get_mut(id)
  }

  #[inline]
  pub fn contains(&self, id: AtomId) -> bool {
    self.atoms.contains_key(id)
  }

  /// Number of atoms in the arena, detached ones included.
  #[inline]
  pub fn len(&self) -> usize {
    self.atoms.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.atoms.is_empty()
  }

  /// Adds a detached atom to the arena.
  pub fn insert(&mut self, atom: Atom) -> AtomId {
    self.atoms.insert(atom)
  }

  pub fn children(&self, parent: AtomId, branch: Branch) -> Option<&[AtomId]> {
    self.atoms.get(parent)?.branch(branch)
  }

  /// Replaces (or creates) `branch` on `parent` with a sentinel followed by
  /// `children`. Previous children are freed.
  pub fn set_branch(&mut self, parent: AtomId, branch: Branch, children: Vec<AtomId>) -> Result<()> {
    let atom = self.atoms.get(parent).ok_or(TreeError::UnknownAtom(parent))?;
    if let Branch::Cell(index) = branch {
      let fits = atom
        .array_shape()
        .is_some_and(|shape| index < array_cell_count(shape));
      if !fits {
        return Err(TreeError::InvalidCell {
          atom: parent,
          branch,
        });
      }
    }
    self.check_detached(&children)?;

    let existing = self.atoms[parent]
      .branches
      .iter()
      .position(|(name, _)| *name == branch);
    let previous = existing.map(|index| self.atoms[parent].branches.remove(index).1);
    for child in previous.into_iter().flatten() {
      self.remove_subtree(child);
    }
    self.push_branch(parent, branch, children);
    Ok(())
  }

  /// Inserts `children` so that the first of them lands at `offset`
  /// (`1..=len`). The children must be detached atoms of this arena.
  pub fn insert_children(
    &mut self,
    parent: AtomId,
    branch: Branch,
    offset: usize,
    children: impl IntoIterator<Item = AtomId>,
  ) -> Result<()> {
    let children: Vec<AtomId> = children.into_iter().collect();
    self.check_detached(&children)?;
    let list = self.branch_list_mut(parent, branch)?;
    let len = list.len();
    if offset == 0 || offset > len {
      return Err(TreeError::OffsetOutOfRange { offset, len });
    }
    list.splice(offset..offset, children);
    Ok(())
  }

  /// Detaches the children at `range` (sentinel excluded) and returns
  /// them. The caller decides whether to free them with
  /// [`AtomTree::remove_subtree`].
  pub fn remove_children(
    &mut self,
    parent: AtomId,
    branch: Branch,
    range: Range<usize>,
  ) -> Result<Vec<AtomId>> {
    let list = self.branch_list_mut(parent, branch)?;
    let len = list.len();
    if range.start == 0 || range.start > range.end || range.end > len {
      return Err(TreeError::InvalidRange {
        start: range.start,
        end: range.end,
        len,
      });
    }
    Ok(list.drain(range).collect())
  }

  /// Frees `id` and everything below it.
  pub fn remove_subtree(&mut self, id: AtomId) {
    let mut stack = vec![id];
    while let Some(id) = stack.pop() {
      if let Some(atom) = self.atoms.remove(id) {
        stack.extend(atom.branches.into_iter().flat_map(|(_, children)| children));
      }
    }
  }

  /// Visits `id` and its descendants depth first, branches in traversal
  /// order. Sentinels are skipped.
  pub fn for_each_descendant(&self, id: AtomId, visitor: &mut impl FnMut(AtomId, &Atom)) {
    let Some(atom) = self.atoms.get(id) else {
      return;
    };
    if atom.is_first() {
      return;
    }
    visitor(id, atom);
    for (_, children) in atom.branches() {
      for child in children {
        self.for_each_descendant(*child, visitor);
      }
    }
  }

  /// Checks the structural invariants of everything reachable from the root.
  pub fn validate(&self) -> Result<()> {
    let mut seen = HashSet::new();
    let mut stack = vec![self.root];
    while let Some(id) = stack.pop() {
      if !seen.insert(id) {
        return Err(TreeError::SharedAtom(id));
      }
      let atom = self.atoms.get(id).ok_or(TreeError::UnknownAtom(id))?;
      if atom.is_first() && !atom.branches.is_empty() {
        return Err(TreeError::SentinelWithBranches(id));
      }
      for (branch, children) in &atom.branches {
        if let Branch::Cell(index) = branch {
          let fits = atom
            .array_shape()
            .is_some_and(|shape| *index < array_cell_count(shape));
          if !fits {
            return Err(TreeError::InvalidCell {
              atom:   id,
              branch: *branch,
            });
          }
        }
        let sentinel = children.first().and_then(|first| self.atoms.get(*first));
        if !sentinel.is_some_and(Atom::is_first) {
          return Err(TreeError::MissingSentinel {
            atom:   id,
            branch: *branch,
          });
        }
        stack.extend(children.iter().copied());
      }
    }
    Ok(())
  }

  // Builders.
  //

  pub fn symbol(&mut self, kind: AtomKind, value: impl Into<Tendril>) -> AtomId {
    self.insert(Atom::math(kind, value))
  }

  /// One text-mode atom per grapheme of `text`.
  pub fn text_run(&mut self, text: &str) -> Vec<AtomId> {
    text
      .graphemes(true)
      .map(|grapheme| self.insert(Atom::text(grapheme)))
      .collect()
  }

  pub fn placeholder(&mut self) -> AtomId {
    self.insert(Atom::placeholder(RenderMode::Math, DEFAULT_PLACEHOLDER))
  }

  pub fn fraction(&mut self, numerator: Vec<AtomId>, denominator: Vec<AtomId>) -> AtomId {
    let fraction = self.insert(Atom::math(AtomKind::Fraction, ""));
    self.push_branch(fraction, Branch::Numerator, numerator);
    self.push_branch(fraction, Branch::Denominator, denominator);
    fraction
  }

  pub fn radical(&mut self, index: Option<Vec<AtomId>>, body: Vec<AtomId>) -> AtomId {
    let radical = self.insert(Atom::math(AtomKind::Radical, "\u{221A}"));
    self.push_branch(radical, Branch::Body, body);
    if let Some(index) = index {
      self.push_branch(radical, Branch::Index, index);
    }
    radical
  }

  /// Adds subscript and/or superscript branches to an existing atom.
  pub fn attach_scripts(
    &mut self,
    base: AtomId,
    subscript: Option<Vec<AtomId>>,
    superscript: Option<Vec<AtomId>>,
  ) -> Result<()> {
    if let Some(subscript) = subscript {
      self.set_branch(base, Branch::Subscript, subscript)?;
    }
    if let Some(superscript) = superscript {
      self.set_branch(base, Branch::Superscript, superscript)?;
    }
    Ok(())
  }

  pub fn left_right(
    &mut self,
    open: impl Into<Tendril>,
    close: impl Into<Tendril>,
    body: Vec<AtomId>,
  ) -> AtomId {
    let group = self.insert(Atom::math(
      AtomKind::LeftRight,
      format!("{}{}", open.into(), close.into()),
    ));
    self.push_branch(group, Branch::Body, body);
    group
  }

  pub fn over_under(
    &mut self,
    body: Vec<AtomId>,
    over: Option<Vec<AtomId>>,
    under: Option<Vec<AtomId>>,
  ) -> AtomId {
    let atom = self.insert(Atom::math(AtomKind::OverUnder, ""));
    self.push_branch(atom, Branch::Body, body);
    if let Some(over) = over {
      self.push_branch(atom, Branch::Overscript, over);
    }
    if let Some(under) = under {
      self.push_branch(atom, Branch::Underscript, under);
    }
    atom
  }

  /// An array atom from rows of cells. `None` leaves a hole in a sparse
  /// array; rows may have different lengths.
  pub fn array(&mut self, rows: Vec<Vec<Option<Vec<AtomId>>>>) -> AtomId {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let shape = ArrayShape::new(rows.len(), columns);
    let mut atom = Atom::math(AtomKind::Array, "");
    atom.array = Some(shape);
    let array = self.insert(atom);
    for (row, cells) in rows.into_iter().enumerate() {
      for (col, cell) in cells.into_iter().enumerate() {
        if let Some(children) = cell {
          self.push_branch(array, Branch::Cell(row * columns + col), children);
        }
      }
    }
    array
  }

  /// Appends `children` to the end of the root body.
  pub fn append_root(&mut self, children: Vec<AtomId>) {
    let root = self.root;
    if let Some(list) = self.atoms[root].branch_mut(Branch::Body) {
      list.extend(children);
    }
  }

  /// Checks that every id names a known atom that no branch holds yet, and
  /// that none appears twice.
  pub fn check_detached(&self, children: &[AtomId]) -> Result<()> {
    if children.is_empty() {
      return Ok(());
    }
    let attached: HashSet<AtomId> = self
      .atoms
      .values()
      .flat_map(|atom| atom.branches.iter().flat_map(|(_, list)| list.iter().copied()))
      .collect();
    let mut seen = HashSet::with_capacity(children.len());
    for child in children {
      if !self.atoms.contains_key(*child) {
        return Err(TreeError::UnknownAtom(*child));
      }
      if *child == self.root || attached.contains(child) || !seen.insert(*child) {
        return Err(TreeError::AttachedAtom(*child));
      }
    }
    Ok(())
  }

  fn branch_list_mut(&mut self, parent: AtomId, branch: Branch) -> Result<&mut Vec<AtomId>> {
    self
      .atoms
      .get_mut(parent)
      .ok_or(TreeError::UnknownAtom(parent))?
      .branch_mut(branch)
      .ok_or(TreeError::MissingBranch {
        atom: parent,
        branch,
      })
  }

  fn push_branch(&mut self, parent: AtomId, branch: Branch, children: Vec<AtomId>) {
    let Some(mode) = self.atoms.get(parent).map(|atom| atom.mode) else {
      return;
    };
    let sentinel = self.atoms.insert(Atom::first(mode));
    let mut list = Vec::with_capacity(children.len() + 1);
    list.push(sentinel);
    list.extend(children);
    self.atoms[parent].branches.push((branch, list));
  }
}
