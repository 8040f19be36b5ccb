//! Keeping required branches visible.
//!
//! Numerators, denominators, radicands, over/under bodies and their
//! annotations must always show something. When one of them holds only
//! its sentinel it receives a placeholder atom; inserting real content
//! removes the placeholders again.

use the_atom::{
  Atom,
  AtomId,
};

use crate::{
  model::MathModel,
  path::{
    self,
    Path,
  },
};

impl MathModel {
  /// Fills the current branch with a placeholder if it is empty and must
  /// show content. Returns whether a placeholder was inserted.
  pub fn adjust_placeholder(&mut self) -> bool {
    let path = self.path().clone();
    self.ensure_placeholder(&path)
  }

  /// [`MathModel::adjust_placeholder`] for an arbitrary branch, wrapped in
  /// content notifications when something is inserted.
  pub(crate) fn ensure_placeholder(&mut self, path: &Path) -> bool {
    if !self.needs_placeholder(path) {
      return false;
    }
    self.content_will_change();
    let inserted = self.insert_placeholder(path);
    self.content_did_change();
    inserted
  }

  /// Inserts the placeholder without notifying the host. For edits that
  /// already sit between content notifications.
  pub(crate) fn insert_placeholder(&mut self, path: &Path) -> bool {
    if !self.needs_placeholder(path) {
      return false;
    }
    let Ok(parent) = path::parent_at(self.tree(), path) else {
      return false;
    };
    let Some(atom) = self.tree().get(parent) else {
      return false;
    };
    let branch = path.branch();
    let role = atom.placeholder_role(branch).unwrap_or_default();
    let placeholder = Atom::placeholder(atom.mode, self.config().placeholder_symbol.as_str());

    let tree = self.tree_mut();
    let placeholder = tree.insert(placeholder);
    if let Err(err) = tree.insert_children(parent, branch, 1, [placeholder]) {
      tracing::warn!(%err, %path, "failed to insert placeholder");
      tree.remove_subtree(placeholder);
      return false;
    }
    tracing::debug!(%path, role, "inserted placeholder");
    true
  }

  /// Whether the branch `path` ends in holds only its sentinel and must
  /// show content.
  fn needs_placeholder(&self, path: &Path) -> bool {
    let Ok(parent) = path::parent_at(self.tree(), path) else {
      return false;
    };
    let branch = path.branch();
    self.tree().get(parent).is_some_and(|atom| {
      atom.branch(branch).is_some_and(|list| list.len() == 1) && atom.requires_content(branch)
    })
  }

  /// Removes every placeholder from the branch `path` ends in and returns
  /// the path with its offset shifted over the removed atoms.
  pub(crate) fn remove_placeholders(&mut self, path: &Path) -> Path {
    let Ok(parent) = path::parent_at(self.tree(), path) else {
      return path.clone();
    };
    let positions: Vec<usize> = path::siblings_at(self.tree(), path)
      .unwrap_or_default()
      .iter()
      .enumerate()
      .skip(1)
      .filter(|(_, id)| self.tree().get(**id).is_some_and(Atom::is_placeholder))
      .map(|(index, _)| index)
      .collect();
    if positions.is_empty() {
      return path.clone();
    }

    let branch = path.branch();
    let mut offset = path.offset();
    for index in positions.into_iter().rev() {
      let removed: Vec<AtomId> = match self.tree_mut().remove_children(parent, branch, index..index + 1) {
        Ok(removed) => removed,
        Err(err) => {
          tracing::warn!(%err, %path, "failed to remove placeholder");
          continue;
        },
      };
      for id in removed {
        self.tree_mut().remove_subtree(id);
      }
      if index <= offset {
        offset -= 1;
      }
    }
    path.with_offset(offset)
  }
}
