//! Addressing positions inside an atom tree.
//!
//! A [`Path`] is a list of [`Step`]s from the root to a sibling list: step
//! `i` names a branch of the atom addressed by steps `0..i` and an offset
//! inside that branch. The last step's offset is a caret position: offset
//! `k` sits immediately after the atom at index `k`, so offset 0 (right
//! after the sentinel) is the start of the list.
//!
//! ```text
//! root body = [first, x, frac(num = [first, 1], den = [first, 2])]
//!
//! body:1              caret after `x`
//! body:2/numerator:0  caret at the start of the numerator
//! body:2              caret after the fraction
//! ```
//!
//! Paths are immutable values. They are validated against a tree with
//! [`validate`] and looked up with [`resolve`] and [`siblings_at`]; the
//! textual form (`Display` / `FromStr`) is what undo logs and hit testing
//! exchange.

use std::{
  fmt,
  str::FromStr,
};

use smallvec::{
  SmallVec,
  smallvec,
};
use the_atom::{
  AtomId,
  AtomTree,
  Branch,
  branch::BranchParseError,
};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
  pub branch: Branch,
  pub offset: usize,
}

impl Step {
  pub const fn new(branch: Branch, offset: usize) -> Self {
    Self { branch, offset }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
  #[error("a path needs at least one step")]
  Empty,
  #[error("the first step must address the root body, found {0}")]
  NotRootBody(Branch),
  #[error("step {depth}: atom has no {branch} branch")]
  MissingBranch { depth: usize, branch: Branch },
  #[error("step {depth}: offset {offset} is out of range for {len} siblings")]
  OffsetOutOfRange {
    depth:  usize,
    offset: usize,
    len:    usize,
  },
  #[error("step {depth}: atom is no longer part of the tree")]
  DanglingAtom { depth: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathParseError {
  #[error("empty path")]
  Empty,
  #[error("malformed step `{0}`, expected `branch:offset`")]
  MalformedStep(String),
  #[error("invalid offset in step `{0}`")]
  InvalidOffset(String),
  #[error("invalid extent `{0}`")]
  InvalidExtent(String),
  #[error(transparent)]
  Branch(#[from] BranchParseError),
  #[error(transparent)]
  Path(#[from] PathError),
}

pub type Result<T> = std::result::Result<T, PathError>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
  steps: SmallVec<[Step; 4]>,
}

impl Default for Path {
  fn default() -> Self {
    Self::root()
  }
}

impl Path {
  /// Caret at the start of the root body.
  pub fn root() -> Self {
    Self {
      steps: smallvec![Step::new(Branch::Body, 0)],
    }
  }

  pub fn new(steps: impl IntoIterator<Item = Step>) -> Result<Self> {
    let steps: SmallVec<[Step; 4]> = steps.into_iter().collect();
    match steps.first() {
      None => Err(PathError::Empty),
      Some(step) if step.branch != Branch::Body => Err(PathError::NotRootBody(step.branch)),
      Some(_) => Ok(Self { steps }),
    }
  }

  /// A root-level caret at `offset`.
  pub fn at_root(offset: usize) -> Self {
    Self {
      steps: smallvec![Step::new(Branch::Body, offset)],
    }
  }

  #[inline]
  pub fn steps(&self) -> &[Step] {
    &self.steps
  }

  #[inline]
  pub fn depth(&self) -> usize {
    self.steps.len()
  }

  #[inline]
  pub fn last(&self) -> Step {
    self.steps[self.steps.len() - 1]
  }

  #[inline]
  pub fn offset(&self) -> usize {
    self.last().offset
  }

  #[inline]
  pub fn branch(&self) -> Branch {
    self.last().branch
  }

  #[must_use]
  pub fn with_offset(&self, offset: usize) -> Self {
    let mut path = self.clone();
    path.last_mut().offset = offset;
    path
  }

  #[must_use]
  pub fn with_branch(&self, branch: Branch, offset: usize) -> Self {
    let mut path = self.clone();
    *path.last_mut() = Step::new(branch, offset);
    path
  }

  /// Path into `branch` of the atom at this path's offset.
  #[must_use]
  pub fn child(&self, branch: Branch, offset: usize) -> Self {
    let mut path = self.clone();
    path.steps.push(Step::new(branch, offset));
    path
  }

  /// Path of the atom that owns this path's sibling list, or `None` at the
  /// root.
  #[must_use]
  pub fn parent(&self) -> Option<Self> {
    (self.steps.len() > 1).then(|| Self {
      steps: self.steps[..self.steps.len() - 1].into(),
    })
  }

  /// Whether both paths address the same sibling list.
  pub fn is_sibling_of(&self, other: &Path) -> bool {
    let depth = self.depth();
    depth == other.depth()
      && self.steps[..depth - 1] == other.steps[..depth - 1]
      && self.branch() == other.branch()
  }

  pub(crate) fn last_mut(&mut self) -> &mut Step {
    let last = self.steps.len() - 1;
    &mut self.steps[last]
  }
}

/// Longest run of identical leading steps.
pub fn common_ancestor<'a>(a: &'a Path, b: &Path) -> &'a [Step] {
  let shared = a
    .steps()
    .iter()
    .zip(b.steps())
    .take_while(|(a, b)| a == b)
    .count();
  &a.steps()[..shared]
}

impl fmt::Display for Path {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, step) in self.steps.iter().enumerate() {
      if i > 0 {
        f.write_str("/")?;
      }
      write!(f, "{}:{}", step.branch, step.offset)?;
    }
    Ok(())
  }
}

impl FromStr for Path {
  type Err = PathParseError;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    let s = s.trim().trim_end_matches('/');
    if s.is_empty() {
      return Err(PathParseError::Empty);
    }
    let steps = s
      .split('/')
      .map(|segment| -> std::result::Result<Step, PathParseError> {
        let (branch, offset) = segment
          .split_once(':')
          .ok_or_else(|| PathParseError::MalformedStep(segment.to_string()))?;
        let offset = offset
          .parse::<usize>()
          .map_err(|_| PathParseError::InvalidOffset(segment.to_string()))?;
        Ok(Step::new(branch.parse()?, offset))
      })
      .collect::<std::result::Result<SmallVec<[Step; 4]>, PathParseError>>()?;
    Ok(Path::new(steps)?)
  }
}

// Tree lookups.
//

/// Walks every step but the last and returns the atom owning the last
/// step's sibling list.
fn walk_to_parent(tree: &AtomTree, path: &Path) -> Result<AtomId> {
  let mut parent = tree.root();
  for (depth, step) in path.steps[..path.depth() - 1].iter().enumerate() {
    let atom = tree.get(parent).ok_or(PathError::DanglingAtom { depth })?;
    let siblings = atom.branch(step.branch).ok_or(PathError::MissingBranch {
      depth,
      branch: step.branch,
    })?;
    parent = *siblings
      .get(step.offset)
      .ok_or(PathError::OffsetOutOfRange {
        depth,
        offset: step.offset,
        len: siblings.len(),
      })?;
  }
  Ok(parent)
}

/// Atom owning the sibling list the path ends in.
pub fn parent_at(tree: &AtomTree, path: &Path) -> Result<AtomId> {
  let parent = walk_to_parent(tree, path)?;
  let depth = path.depth() - 1;
  let atom = tree.get(parent).ok_or(PathError::DanglingAtom { depth })?;
  if !atom.has_branch(path.branch()) {
    return Err(PathError::MissingBranch {
      depth,
      branch: path.branch(),
    });
  }
  Ok(parent)
}

/// Sibling list of the last step, sentinel included. The last offset is not
/// checked.
pub fn siblings_at<'a>(tree: &'a AtomTree, path: &Path) -> Option<&'a [AtomId]> {
  let parent = walk_to_parent(tree, path).ok()?;
  tree.get(parent)?.branch(path.branch())
}

/// Checks every step, the last offset included.
pub fn validate(tree: &AtomTree, path: &Path) -> Result<()> {
  let parent = parent_at(tree, path)?;
  let depth = path.depth() - 1;
  let len = tree
    .get(parent)
    .and_then(|atom| atom.branch(path.branch()))
    .map_or(0, <[AtomId]>::len);
  if path.offset() >= len {
    return Err(PathError::OffsetOutOfRange {
      depth,
      offset: path.offset(),
      len,
    });
  }
  Ok(())
}

/// Atom at the last step's offset.
pub fn resolve(tree: &AtomTree, path: &Path) -> Option<AtomId> {
  siblings_at(tree, path)?.get(path.offset()).copied()
}

/// Every caret position of the tree in document order (the order `next`
/// visits them, ignoring atoms that capture the selection).
pub fn positions(tree: &AtomTree) -> Vec<Path> {
  let mut out = Vec::new();
  collect_positions(tree, &Path::root(), &mut out);
  out
}

fn collect_positions(tree: &AtomTree, path: &Path, out: &mut Vec<Path>) {
  let Some(siblings) = siblings_at(tree, path) else {
    return;
  };
  for (offset, id) in siblings.iter().enumerate() {
    if offset > 0
      && let Some(atom) = tree.get(*id)
    {
      for branch in atom.navigable_branches() {
        collect_positions(tree, &path.with_offset(offset).child(branch, 0), out);
      }
    }
    out.push(path.with_offset(offset));
  }
}
