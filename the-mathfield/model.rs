//! The editing model: an atom tree, the selection inside it and the host
//! that observes both.
//!
//! Every public operation keeps the selection valid for the current tree.
//! Requests that name a branch the target atom does not have are refused
//! (`false`, nothing changes, nothing is notified); paths that no longer
//! fit the tree at all are logged and replaced by the root caret.
//!
//! Notifications follow a will/did pattern. Inside a
//! [`NotificationScope`] they are collected instead, and the outermost
//! scope fires at most one "did change" per kind when it is dropped.

use std::{
  fmt,
  ops::{
    Deref,
    DerefMut,
  },
};

use the_atom::{
  Atom,
  AtomId,
  AtomTree,
  Branch,
};

use crate::{
  config::ModelConfig,
  host::{
    Announcement,
    NavigationHost,
    NullHost,
  },
  movement::{
    Direction,
    ExitDirection,
  },
  path::{
    self,
    Path,
    PathError,
  },
  selection::Selection,
};

#[derive(Debug, Default, Clone, Copy)]
struct Pending {
  selection: bool,
  content:   bool,
}

pub struct MathModel {
  tree:           AtomTree,
  selection:      Selection,
  host:           Box<dyn NavigationHost>,
  config:         ModelConfig,
  suppress_depth: usize,
  pending:        Pending,
}

impl fmt::Debug for MathModel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MathModel")
      .field("selection", &self.selection)
      .field("config", &self.config)
      .field("suppress_depth", &self.suppress_depth)
      .finish_non_exhaustive()
  }
}

impl Default for MathModel {
  fn default() -> Self {
    Self::new(AtomTree::new())
  }
}

impl MathModel {
  /// A model over `tree` with the caret at the start of the root.
  pub fn new(tree: AtomTree) -> Self {
    Self {
      tree,
      selection: Selection::default(),
      host: Box::new(NullHost),
      config: ModelConfig::default(),
      suppress_depth: 0,
      pending: Pending::default(),
    }
  }

  #[must_use]
  pub fn with_host(mut self, host: impl NavigationHost + 'static) -> Self {
    self.host = Box::new(host);
    self
  }

  #[must_use]
  pub fn with_config(mut self, config: ModelConfig) -> Self {
    self.config = config;
    self
  }

  /// Installs a new host and returns the previous one.
  pub fn set_host(&mut self, host: impl NavigationHost + 'static) -> Box<dyn NavigationHost> {
    std::mem::replace(&mut self.host, Box::new(host))
  }

  pub fn config(&self) -> &ModelConfig {
    &self.config
  }

  pub fn set_config(&mut self, config: ModelConfig) {
    self.config = config;
  }

  pub fn tree(&self) -> &AtomTree {
    &self.tree
  }

  /// Direct access to the tree. Call [`MathModel::revalidate`] after
  /// structural changes so the selection follows.
  pub fn tree_mut(&mut self) -> &mut AtomTree {
    &mut self.tree
  }

  /// Swaps in a new tree and returns the old one. The selection is kept
  /// when it still fits, clamped when only its offsets are off and reset
  /// to the root caret otherwise.
  pub fn replace_tree(&mut self, tree: AtomTree) -> AtomTree {
    self.content_will_change();
    let previous = std::mem::replace(&mut self.tree, tree);
    self.content_did_change();
    self.revalidate();
    previous
  }

  #[inline]
  pub fn selection(&self) -> &Selection {
    &self.selection
  }

  #[inline]
  pub fn path(&self) -> &Path {
    &self.selection.path
  }

  /// Textual form of the selection, e.g. `body:2/numerator:1#-1`.
  pub fn to_path(&self) -> String {
    self.selection.to_string()
  }

  /// The sibling list the selection lives in, sentinel included.
  pub fn siblings(&self) -> Option<&[AtomId]> {
    path::siblings_at(&self.tree, &self.selection.path)
  }

  /// Atom owning the selection's sibling list.
  pub fn parent_atom(&self) -> Option<AtomId> {
    path::parent_at(&self.tree, &self.selection.path).ok()
  }

  /// Atom right before the anchor (the sentinel at offset 0).
  pub fn anchor_atom(&self) -> Option<AtomId> {
    path::resolve(&self.tree, &self.selection.path)
  }

  /// Moves the selection within the current parent.
  ///
  /// A negative `offset` counts from the end of the list (`-1` is the last
  /// offset). `branch` switches to another branch of the same parent atom;
  /// `false` is returned, without any notification, when the parent has no
  /// such branch. Offsets and extent are clamped into the list.
  pub fn set_selection(&mut self, offset: isize, extent: isize, branch: Option<Branch>) -> bool {
    let current = &self.selection.path;
    let path = current.with_branch(branch.unwrap_or(current.branch()), 0);
    let offset = match path::siblings_at(&self.tree, &path) {
      Some(siblings) if offset < 0 => siblings.len().saturating_add_signed(offset),
      _ => usize::try_from(offset).unwrap_or_default(),
    };
    self.set_path(path.with_offset(offset), extent)
  }

  /// Selects `extent` atoms from `path`.
  ///
  /// A missing branch in the last step is refused. Any other mismatch with
  /// the tree is logged and resets the model to the root caret.
  pub fn set_path(&mut self, path: Path, extent: isize) -> bool {
    match path::parent_at(&self.tree, &path) {
      Ok(_) => {},
      Err(PathError::MissingBranch { depth, branch }) if depth + 1 == path.depth() => {
        tracing::debug!(%path, %branch, "refusing selection in a missing branch");
        return false;
      },
      Err(err) => {
        tracing::warn!(%err, %path, "invalid path, resetting to the start of the expression");
        self.reset_to_root();
        return false;
      },
    }
    let selection = self.clamp(path, extent);
    self.move_to(selection)
  }

  /// Brings the selection back in line with the tree after outside edits.
  pub fn revalidate(&mut self) -> bool {
    let path = self.selection.path.clone();
    match path::parent_at(&self.tree, &path) {
      Ok(_) => {
        let selection = self.clamp(path, self.selection.extent);
        self.commit_selection(selection)
      },
      Err(err) => {
        tracing::warn!(%err, %path, "selection no longer fits the tree, resetting");
        self.reset_to_root()
      },
    }
  }

  pub fn reset_to_root(&mut self) -> bool {
    self.commit_selection(Selection::default())
  }

  /// The selected atoms in order, `None` for a caret.
  pub fn selected_atoms(&self) -> Option<Vec<AtomId>> {
    let range = self.selection.atom_range()?;
    let siblings = self.siblings()?;
    siblings.get(range).map(<[AtomId]>::to_vec)
  }

  /// Visits the selected atoms, and with `recursive` everything inside
  /// them, depth first.
  pub fn for_each_selected(&self, mut visitor: impl FnMut(AtomId, &Atom), recursive: bool) {
    let Some(selected) = self.selected_atoms() else {
      return;
    };
    for id in selected {
      if recursive {
        self.tree.for_each_descendant(id, &mut visitor);
      } else if let Some(atom) = self.tree.get(id) {
        visitor(id, atom);
      }
    }
  }

  /// Selects the whole root list.
  pub fn select_all(&mut self) -> bool {
    let previous = self.selection.path.clone();
    let last = self.list_len(&Path::root()).saturating_sub(1);
    let selected = self.move_to(Selection::new(Path::root(), last as isize));
    if selected {
      self.announce(Announcement::Select, &previous);
    }
    selected
  }

  /// Turns a range into a caret at its end in `direction`.
  pub fn collapse(&mut self, direction: Direction) -> bool {
    if self.selection.is_collapsed() {
      return false;
    }
    let selection = self.selection.collapse(direction);
    self.move_to(selection)
  }

  // Notifications.
  //

  /// Collects notifications until the returned scope (and every scope
  /// nested in it) is dropped.
  pub fn suppress_notifications(&mut self) -> NotificationScope<'_> {
    self.suppress_depth += 1;
    NotificationScope { model: self }
  }

  pub fn with_notifications_suppressed<R>(&mut self, f: impl FnOnce(&mut MathModel) -> R) -> R {
    let mut scope = self.suppress_notifications();
    f(&mut scope)
  }

  #[inline]
  pub fn notifications_suppressed(&self) -> bool {
    self.suppress_depth > 0
  }

  pub(crate) fn commit_selection(&mut self, selection: Selection) -> bool {
    if selection == self.selection {
      return false;
    }
    if !self.notifications_suppressed() {
      self.host.selection_will_change();
    }
    self.selection = selection;
    if self.notifications_suppressed() {
      self.pending.selection = true;
    } else {
      self.host.selection_did_change();
    }
    true
  }

  pub(crate) fn content_will_change(&mut self) {
    if !self.notifications_suppressed() {
      self.host.content_will_change();
    }
  }

  pub(crate) fn content_did_change(&mut self) {
    if self.notifications_suppressed() {
      self.pending.content = true;
    } else {
      self.host.content_did_change();
    }
  }

  pub(crate) fn announce(&mut self, event: Announcement, previous: &Path) {
    if !self.notifications_suppressed() {
      self.host.announce(event, previous, &self.selection.path);
    }
  }

  /// Whether the host takes the caret out of the field. Never asked while
  /// notifications are suppressed.
  pub(crate) fn consult_move_out(&mut self, direction: ExitDirection) -> bool {
    !self.notifications_suppressed() && self.host.move_out(direction)
  }

  pub(crate) fn consult_tab_out(&mut self, direction: ExitDirection) -> bool {
    !self.notifications_suppressed() && self.host.tab_out(direction)
  }

  fn flush_pending(&mut self) {
    let pending = std::mem::take(&mut self.pending);
    if pending.content {
      self.host.content_did_change();
    }
    if pending.selection {
      self.host.selection_did_change();
    }
  }

  // Helpers.
  //

  /// Moves to `selection`, filling the branch being left first when it
  /// needs a placeholder.
  pub(crate) fn move_to(&mut self, selection: Selection) -> bool {
    if selection == self.selection {
      return false;
    }
    if !selection.path.is_sibling_of(&self.selection.path) {
      self.adjust_placeholder();
    }
    self.commit_selection(selection)
  }

  /// Length of the list `path` ends in, sentinel included; 0 when the path
  /// does not resolve.
  pub(crate) fn list_len(&self, path: &Path) -> usize {
    path::siblings_at(&self.tree, path).map_or(0, <[AtomId]>::len)
  }

  pub(crate) fn clamp(&self, path: Path, extent: isize) -> Selection {
    let last = self.list_len(&path).saturating_sub(1);
    let anchor = path.offset().min(last);
    let focus = anchor.saturating_add_signed(extent).min(last);
    Selection::new(path.with_offset(anchor), focus as isize - anchor as isize)
  }

  /// Caret at the first (`Backward`) or last (`Forward`) root offset.
  pub(crate) fn root_edge(&self, edge: Direction) -> Path {
    match edge {
      Direction::Backward => Path::root(),
      Direction::Forward => Path::at_root(self.list_len(&Path::root()).saturating_sub(1)),
    }
  }
}

/// Batches notifications. Dereferences to the model so operations run
/// through the scope.
pub struct NotificationScope<'a> {
  model: &'a mut MathModel,
}

impl Deref for NotificationScope<'_> {
  type Target = MathModel;

  fn deref(&self) -> &MathModel {
    self.model
  }
}

impl DerefMut for NotificationScope<'_> {
  fn deref_mut(&mut self) -> &mut MathModel {
    self.model
  }
}

impl Drop for NotificationScope<'_> {
  fn drop(&mut self) {
    self.model.suppress_depth -= 1;
    if self.model.suppress_depth == 0 {
      self.model.flush_pending();
    }
  }
}

#[cfg(test)]
mod tests {
  use the_atom::AtomKind;

  use super::*;
  use crate::test_trees::{
    HostEvent,
    RecordingHost,
    matrix,
    simple_fraction,
  };

  fn recorded(tree: AtomTree) -> (MathModel, RecordingHost) {
    let host = RecordingHost::default();
    (MathModel::new(tree).with_host(host.clone()), host)
  }

  #[test]
  fn negative_offsets_count_from_the_end() {
    let (tree, _) = simple_fraction();
    let mut model = MathModel::new(tree);
    assert!(model.set_selection(-1, 0, None));
    assert_eq!(model.path(), &Path::at_root(2));
    assert!(model.set_selection(-2, 0, None));
    assert_eq!(model.path(), &Path::at_root(1));
  }

  #[test]
  fn offsets_and_extent_are_clamped() {
    let (tree, _) = simple_fraction();
    let mut model = MathModel::new(tree);
    assert!(model.set_selection(9, 4, None));
    assert_eq!(model.selection(), &Selection::caret(Path::at_root(2)));
    assert!(model.set_selection(1, -5, None));
    assert_eq!(model.selection(), &Selection::new(Path::at_root(1), -1));
  }

  #[test]
  fn switching_to_a_sibling_branch() {
    let (tree, _) = simple_fraction();
    let mut model = MathModel::new(tree);
    assert!(model.set_path(Path::at_root(2).child(Branch::Numerator, 1), 0));
    assert!(model.set_selection(0, 0, Some(Branch::Denominator)));
    assert_eq!(model.to_path(), "body:2/denominator:0");
  }

  #[test]
  fn missing_branch_is_refused_silently() {
    let (tree, _) = simple_fraction();
    let (mut model, host) = recorded(tree);
    assert!(!model.set_selection(0, 0, Some(Branch::Superscript)));
    assert!(!model.set_selection(0, 0, Some(Branch::Cell(0))));
    assert!(!model.set_path(Path::at_root(1).child(Branch::Numerator, 0), 0));
    assert_eq!(model.path(), &Path::root());
    assert!(host.take().is_empty());
  }

  #[test]
  fn invalid_intermediate_step_resets_to_root() {
    let (tree, _) = simple_fraction();
    let mut model = MathModel::new(tree);
    model.set_selection(2, 0, None);
    let bogus = Path::at_root(1)
      .child(Branch::Numerator, 0)
      .child(Branch::Body, 0);
    assert!(!model.set_path(bogus, 0));
    assert_eq!(model.path(), &Path::root());
  }

  #[test]
  fn selection_change_notifies_will_then_did() {
    let (tree, _) = simple_fraction();
    let (mut model, host) = recorded(tree);
    model.set_selection(1, 0, None);
    assert_eq!(host.take(), vec![
      HostEvent::SelectionWillChange,
      HostEvent::SelectionDidChange
    ]);
    model.set_selection(1, 0, None);
    assert!(host.take().is_empty());
  }

  #[test]
  fn nested_scopes_fire_one_notification() {
    let (tree, _) = simple_fraction();
    let (mut model, host) = recorded(tree);
    {
      let mut outer = model.suppress_notifications();
      outer.set_selection(1, 0, None);
      {
        let mut inner = outer.suppress_notifications();
        inner.set_selection(2, 0, None);
      }
      outer.set_selection(0, 1, None);
      assert!(host.take().is_empty());
    }
    assert_eq!(host.take(), vec![HostEvent::SelectionDidChange]);
    assert!(!model.notifications_suppressed());
  }

  #[test]
  fn closure_scope_reports_nothing_when_unchanged() {
    let (tree, _) = simple_fraction();
    let (mut model, host) = recorded(tree);
    let moved = model.with_notifications_suppressed(|model| model.set_selection(0, 0, None));
    assert!(!moved);
    assert!(host.take().is_empty());
  }

  #[test]
  fn replace_tree_clamps_the_selection() {
    let (tree, _) = simple_fraction();
    let (mut model, host) = recorded(tree);
    model.set_selection(2, 0, None);
    host.take();

    let mut smaller = AtomTree::new();
    let y = smaller.symbol(AtomKind::Ordinary, "y");
    smaller.append_root(vec![y]);
    model.replace_tree(smaller);

    assert_eq!(model.path(), &Path::at_root(1));
    assert_eq!(host.take(), vec![
      HostEvent::ContentWillChange,
      HostEvent::ContentDidChange,
      HostEvent::SelectionWillChange,
      HostEvent::SelectionDidChange,
    ]);
  }

  #[test]
  fn replace_tree_resets_unreachable_paths() {
    let (tree, _) = matrix();
    let mut model = MathModel::new(tree);
    model.set_path(Path::at_root(1).child(Branch::Cell(3), 1), 0);
    model.replace_tree(AtomTree::new());
    assert_eq!(model.path(), &Path::root());
  }

  #[test]
  fn selected_atoms_and_visitors() {
    let (tree, fraction) = simple_fraction();
    let mut model = MathModel::new(tree);
    assert_eq!(model.selected_atoms(), None);

    model.set_selection(1, 1, None);
    assert_eq!(model.selected_atoms(), Some(vec![fraction]));

    let mut shallow = Vec::new();
    model.for_each_selected(|_, atom| shallow.push(atom.kind), false);
    assert_eq!(shallow, vec![AtomKind::Fraction]);

    let mut deep = Vec::new();
    model.for_each_selected(|_, atom| deep.push(atom.value.to_string()), true);
    assert_eq!(deep, vec!["", "a", "b"]);
  }

  #[test]
  fn select_all_and_collapse() {
    let (tree, fraction) = simple_fraction();
    let mut model = MathModel::new(tree);
    assert!(model.select_all());
    assert_eq!(model.selected_atoms().map(|atoms| atoms.len()), Some(2));
    assert!(model.collapse(Direction::Forward));
    assert_eq!(model.selection(), &Selection::caret(Path::at_root(2)));
    assert!(!model.collapse(Direction::Backward));
    assert_eq!(model.anchor_atom(), Some(fraction));
  }
}
