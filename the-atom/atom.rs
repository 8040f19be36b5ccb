//! The atom: one node of a math expression tree.

use serde::{
  Deserialize,
  Serialize,
};
use smallvec::SmallVec;

use crate::{
  AtomId,
  Tendril,
  array::ArrayShape,
  branch::{
    BRANCH_ORDER,
    Branch,
  },
};

/// Semantic role of an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AtomKind {
  /// Sentinel at index 0 of every branch.
  First,
  Placeholder,
  Root,
  Ordinary,
  Binary,
  Relation,
  /// Large or named operator (`\sum`, `\sin`); its body is scaffolding.
  Operator,
  /// Opening fence.
  Open,
  /// Closing fence.
  Close,
  Punctuation,
  Fraction,
  Radical,
  /// Carrier for scripts without a base; its body is scaffolding.
  Scripts,
  /// `\left ... \right` delimited group.
  LeftRight,
  Array,
  OverUnder,
  Group,
  Space,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
  #[default]
  Math,
  Text,
}

/// Visual attributes. Structure never depends on them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Style {
  pub color:       Option<Tendril>,
  pub background:  Option<Tendril>,
  pub font_family: Option<Tendril>,
  pub font_series: Option<Tendril>,
  pub font_shape:  Option<Tendril>,
  pub font_size:   Option<u8>,
}

#[derive(Debug, Clone)]
pub struct Atom {
  pub kind:               AtomKind,
  pub mode:               RenderMode,
  pub value:              Tendril,
  /// When set, the caret treats the atom as a leaf and never enters its
  /// branches.
  pub captures_selection: bool,
  pub style:              Style,
  pub(crate) branches:    SmallVec<[(Branch, Vec<AtomId>); 2]>,
  pub(crate) array:       Option<ArrayShape>,
}

impl Atom {
  pub fn new(kind: AtomKind, mode: RenderMode, value: impl Into<Tendril>) -> Self {
    Self {
      kind,
      mode,
      value: value.into(),
      captures_selection: false,
      style: Style::default(),
      branches: SmallVec::new(),
      array: None,
    }
  }

  pub fn math(kind: AtomKind, value: impl Into<Tendril>) -> Self {
    Self::new(kind, RenderMode::Math, value)
  }

  pub fn text(value: impl Into<Tendril>) -> Self {
    Self::new(AtomKind::Ordinary, RenderMode::Text, value)
  }

  pub fn first(mode: RenderMode) -> Self {
    Self::new(AtomKind::First, mode, "")
  }

  pub fn placeholder(mode: RenderMode, value: impl Into<Tendril>) -> Self {
    Self::new(AtomKind::Placeholder, mode, value)
  }

  #[must_use]
  pub fn with_captured_selection(mut self) -> Self {
    self.captures_selection = true;
    self
  }

  #[must_use]
  pub fn with_style(mut self, style: Style) -> Self {
    self.style = style;
    self
  }

  #[inline]
  pub fn is_first(&self) -> bool {
    self.kind == AtomKind::First
  }

  #[inline]
  pub fn is_placeholder(&self) -> bool {
    self.kind == AtomKind::Placeholder
  }

  #[inline]
  pub fn is_text(&self) -> bool {
    self.mode == RenderMode::Text
  }

  /// Children of `branch`, sentinel included, if the branch exists.
  pub fn branch(&self, branch: Branch) -> Option<&[AtomId]> {
    self
      .branches
      .iter()
      .find(|(name, _)| *name == branch)
      .map(|(_, children)| children.as_slice())
  }

  pub(crate) fn branch_mut(&mut self, branch: Branch) -> Option<&mut Vec<AtomId>> {
    self
      .branches
      .iter_mut()
      .find(|(name, _)| *name == branch)
      .map(|(_, children)| children)
  }

  #[inline]
  pub fn has_branch(&self, branch: Branch) -> bool {
    self.branch(branch).is_some()
  }

  /// Existing branches in transition order.
  pub fn branches(&self) -> impl Iterator<Item = (Branch, &[AtomId])> + '_ {
    let mut branches: SmallVec<[(Branch, &[AtomId]); 4]> = self
      .branches
      .iter()
      .map(|(branch, children)| (*branch, children.as_slice()))
      .collect();
    branches.sort_by_key(|(branch, _)| *branch);
    branches.into_iter()
  }

  pub fn array_shape(&self) -> Option<ArrayShape> {
    self.array
  }

  #[inline]
  pub fn is_array(&self) -> bool {
    self.array.is_some()
  }

  /// Whether `branch` can hold the caret. The body of operators and of
  /// script carriers only exists to hang scripts on.
  pub fn is_navigable(&self, branch: Branch) -> bool {
    if !self.has_branch(branch) {
      return false;
    }
    match branch {
      Branch::Body => !matches!(self.kind, AtomKind::Operator | AtomKind::Scripts),
      Branch::Cell(_) => self.array.is_some(),
      _ => true,
    }
  }

  /// Branches the caret may enter, in traversal order. Arrays expose their
  /// existing cells; everything else its named branches.
  pub fn navigable_branches(&self) -> SmallVec<[Branch; 4]> {
    if self.captures_selection {
      return SmallVec::new();
    }
    if self.array.is_some() {
      let mut cells: SmallVec<[Branch; 4]> = self
        .branches
        .iter()
        .map(|(branch, _)| *branch)
        .filter(|branch| branch.is_cell())
        .collect();
      cells.sort();
      return cells;
    }
    BRANCH_ORDER
      .iter()
      .copied()
      .filter(|branch| self.is_navigable(*branch))
      .collect()
  }

  /// Whether `branch` must show something when it has no real content.
  pub fn requires_content(&self, branch: Branch) -> bool {
    match branch {
      Branch::Numerator | Branch::Denominator | Branch::Overscript | Branch::Underscript => true,
      Branch::Body => matches!(self.kind, AtomKind::Radical | AtomKind::OverUnder),
      _ => false,
    }
  }

  /// Accessibility name of the placeholder standing in for `branch`.
  pub fn placeholder_role(&self, branch: Branch) -> Option<&'static str> {
    if !self.requires_content(branch) {
      return None;
    }
    let role = match branch {
      Branch::Numerator => "numerator",
      Branch::Denominator => "denominator",
      Branch::Overscript | Branch::Underscript => "annotation",
      Branch::Body if self.kind == AtomKind::Radical => "radicand",
      _ => "base",
    };
    Some(role)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn with_branches(kind: AtomKind, branches: &[Branch]) -> Atom {
    let mut atom = Atom::math(kind, "");
    for branch in branches {
      atom.branches.push((*branch, Vec::new()));
    }
    atom
  }

  #[test]
  fn navigable_branches_follow_transition_order() {
    let atom = with_branches(AtomKind::Ordinary, &[
      Branch::Superscript,
      Branch::Subscript,
    ]);
    assert_eq!(atom.navigable_branches().as_slice(), &[
      Branch::Subscript,
      Branch::Superscript
    ]);
  }

  #[test]
  fn operator_body_is_not_navigable() {
    let atom = with_branches(AtomKind::Operator, &[Branch::Body, Branch::Subscript]);
    assert!(!atom.is_navigable(Branch::Body));
    assert_eq!(atom.navigable_branches().as_slice(), &[Branch::Subscript]);
  }

  #[test]
  fn captured_atoms_expose_no_branches() {
    let atom = with_branches(AtomKind::Group, &[Branch::Body]).with_captured_selection();
    assert!(atom.navigable_branches().is_empty());
  }

  #[test]
  fn required_content_depends_on_role() {
    let fraction = with_branches(AtomKind::Fraction, &[
      Branch::Numerator,
      Branch::Denominator,
    ]);
    assert!(fraction.requires_content(Branch::Numerator));
    assert_eq!(fraction.placeholder_role(Branch::Denominator), Some("denominator"));

    let radical = with_branches(AtomKind::Radical, &[Branch::Body, Branch::Index]);
    assert!(radical.requires_content(Branch::Body));
    assert!(!radical.requires_content(Branch::Index));
    assert_eq!(radical.placeholder_role(Branch::Body), Some("radicand"));

    let group = with_branches(AtomKind::LeftRight, &[Branch::Body]);
    assert!(!group.requires_content(Branch::Body));
    assert!(!group.requires_content(Branch::Superscript));
  }
}
