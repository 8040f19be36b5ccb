//! Minimal tree surgery at the selection.
//!
//! Inserting replaces the selection and drops any placeholder standing in
//! the branch. Deleting frees the removed subtrees; a required branch that
//! ends up empty gets its placeholder back with the caret after it.

use the_atom::AtomId;

use crate::{
  host::Announcement,
  model::MathModel,
  path,
  selection::Selection,
};

impl MathModel {
  /// Inserts detached `atoms` (already in the tree's arena) after the
  /// caret, replacing the selection. The caret ends after the last
  /// inserted atom.
  pub fn insert(&mut self, atoms: Vec<AtomId>) -> bool {
    if atoms.is_empty() {
      return false;
    }
    if let Err(err) = self.tree().check_detached(&atoms) {
      tracing::warn!(%err, "refusing to insert atoms");
      return false;
    }
    if !self.selection().is_collapsed() {
      self.delete_selection();
    }

    let previous = self.path().clone();
    let Ok(parent) = path::parent_at(self.tree(), &previous) else {
      return false;
    };
    self.content_will_change();
    let path = self.remove_placeholders(&previous);
    let count = atoms.len();
    if let Err(err) = self
      .tree_mut()
      .insert_children(parent, path.branch(), path.offset() + 1, atoms)
    {
      tracing::warn!(%err, %path, "failed to insert atoms");
      self.content_did_change();
      return false;
    }
    self.content_did_change();

    self.commit_selection(Selection::caret(path.with_offset(path.offset() + count)));
    self.announce(Announcement::Insert, &previous);
    true
  }

  /// Deletes the selection, or the atom before the caret. At the start of
  /// a branch, or on the lone placeholder of a required branch, the caret
  /// moves back instead.
  pub fn delete_backward(&mut self) -> bool {
    if !self.selection().is_collapsed() {
      return self.delete_selection();
    }
    let offset = self.path().offset();
    if offset == 0 || self.only_placeholder() {
      if self.path().depth() == 1 {
        self.plonk();
        return false;
      }
      return self.previous();
    }
    self.delete_atoms(offset, offset, offset - 1)
  }

  /// Deletes the selection, or the atom after the caret.
  pub fn delete_forward(&mut self) -> bool {
    if !self.selection().is_collapsed() {
      return self.delete_selection();
    }
    let offset = self.path().offset();
    let last = self.list_len(self.path()).saturating_sub(1);
    if offset >= last || self.only_placeholder() {
      self.plonk();
      return false;
    }
    self.delete_atoms(offset + 1, offset + 1, offset)
  }

  /// Deletes the selected atoms and collapses to where they were.
  pub fn delete_selection(&mut self) -> bool {
    let Some(range) = self.selection().atom_range() else {
      return false;
    };
    let start = self.selection().start();
    self.delete_atoms(*range.start(), *range.end(), start)
  }

  // Helpers.
  //

  /// Whether the branch must show content and holds nothing but its
  /// placeholder.
  fn only_placeholder(&self) -> bool {
    let Some(siblings) = self.siblings() else {
      return false;
    };
    let required = self
      .parent_atom()
      .and_then(|parent| self.tree().get(parent))
      .is_some_and(|parent| parent.requires_content(self.path().branch()));
    required
      && siblings.len() == 2
      && self
        .tree()
        .get(siblings[1])
        .is_some_and(|atom| atom.is_placeholder())
  }

  /// Removes atoms `first..=last` of the current list and puts the caret
  /// at `caret`.
  fn delete_atoms(&mut self, first: usize, last: usize, caret: usize) -> bool {
    let previous = self.path().clone();
    let Ok(parent) = path::parent_at(self.tree(), &previous) else {
      return false;
    };

    self.content_will_change();
    let removed = match self
      .tree_mut()
      .remove_children(parent, previous.branch(), first..last + 1)
    {
      Ok(removed) => removed,
      Err(err) => {
        tracing::warn!(%err, path = %previous, "failed to delete atoms");
        self.content_did_change();
        return false;
      },
    };
    for id in removed {
      self.tree_mut().remove_subtree(id);
    }

    let target = previous.with_offset(caret);
    let target = if self.insert_placeholder(&target) {
      target.with_offset(1)
    } else {
      target
    };
    self.content_did_change();

    self.commit_selection(Selection::caret(target));
    self.announce(Announcement::Delete, &previous);
    true
  }

  fn plonk(&mut self) {
    let previous = self.path().clone();
    self.announce(Announcement::Plonk, &previous);
  }
}

#[cfg(test)]
mod tests {
  use the_atom::{
    AtomTree,
    Branch,
  };

  use super::*;
  use crate::{
    path::Path,
    test_trees::{
      HostEvent,
      RecordingHost,
      arbitrary_filled_tree,
      empty_numerator,
      ord,
      placeholders_in,
      simple_fraction,
    },
  };

  fn numerator(model: &MathModel, fraction: AtomId) -> Vec<AtomId> {
    model
      .tree()
      .children(fraction, Branch::Numerator)
      .unwrap()
      .to_vec()
  }

  #[test]
  fn insert_replaces_the_placeholder() {
    let (tree, fraction) = empty_numerator();
    let mut model = MathModel::new(tree);
    model.set_selection(1, 0, None);
    model.next();
    assert_eq!(placeholders_in(model.tree(), &numerator(&model, fraction)), 1);

    let y = ord(model.tree_mut(), "y");
    assert!(model.insert(vec![y]));
    assert_eq!(model.to_path(), "body:2/numerator:1");
    assert_eq!(numerator(&model, fraction)[1..], [y]);
    assert_eq!(model.tree().len(), 8);
    assert!(model.tree().validate().is_ok());
  }

  #[test]
  fn insert_replaces_the_selection() {
    let (tree, _) = simple_fraction();
    let mut model = MathModel::new(tree);
    model.select_all();

    let z = ord(model.tree_mut(), "z");
    assert!(model.insert(vec![z]));
    assert_eq!(model.to_path(), "body:1");
    assert_eq!(model.tree().len(), 3);
  }

  #[test]
  fn emptying_a_numerator_restores_its_placeholder() {
    let (tree, fraction) = simple_fraction();
    let mut model = MathModel::new(tree);
    model.set_path(Path::at_root(2).child(Branch::Numerator, 1), 0);

    assert!(model.delete_backward());
    assert_eq!(model.to_path(), "body:2/numerator:1");
    let atoms = numerator(&model, fraction);
    assert_eq!(atoms.len(), 2);
    assert_eq!(placeholders_in(model.tree(), &atoms), 1);

    assert!(model.delete_backward());
    assert_eq!(model.to_path(), "body:2/numerator:0");
    assert_eq!(numerator(&model, fraction), atoms);
    assert!(!model.delete_forward());
  }

  #[test]
  fn delete_forward_removes_the_next_atom() {
    let (tree, fraction) = simple_fraction();
    let mut model = MathModel::new(tree);
    assert!(model.delete_forward());
    assert_eq!(model.to_path(), "body:0");
    assert_eq!(
      model.tree().children(model.tree().root(), Branch::Body).unwrap()[1..],
      [fraction]
    );
    model.set_selection(-1, 0, None);
    assert!(!model.delete_forward());
  }

  #[test]
  fn delete_selection_frees_the_subtree() {
    let (tree, _) = simple_fraction();
    let host = RecordingHost::default();
    let mut model = MathModel::new(tree).with_host(host.clone());
    model.set_selection(1, 1, None);
    host.take();

    assert!(model.delete_selection());
    assert_eq!(model.to_path(), "body:1");
    assert_eq!(model.tree().len(), 3);
    assert_eq!(host.take(), vec![
      HostEvent::ContentWillChange,
      HostEvent::ContentDidChange,
      HostEvent::SelectionWillChange,
      HostEvent::SelectionDidChange,
      HostEvent::Announce(Announcement::Delete, "body:1".into()),
    ]);
  }

  #[test]
  fn emptying_delete_sends_one_content_change() {
    let (tree, _) = simple_fraction();
    let host = RecordingHost::default();
    let mut model = MathModel::new(tree).with_host(host.clone());
    model.set_path(Path::at_root(2).child(Branch::Numerator, 1), 0);
    host.take();

    assert!(model.delete_backward());
    assert_eq!(host.take(), vec![
      HostEvent::ContentWillChange,
      HostEvent::ContentDidChange,
      HostEvent::Announce(Announcement::Delete, "body:2/numerator:1".into()),
    ]);
  }

  #[test]
  fn insert_refuses_atoms_already_in_the_tree() {
    let (tree, _) = simple_fraction();
    let host = RecordingHost::default();
    let mut model = MathModel::new(tree).with_host(host.clone());
    let x = model.tree().children(model.tree().root(), Branch::Body).unwrap()[1];
    model.set_selection(-1, 0, None);
    host.take();

    assert!(!model.insert(vec![x]));
    assert!(host.take().is_empty());
    assert_eq!(model.to_path(), "body:2");
    assert!(model.tree().validate().is_ok());
  }

  #[test]
  fn delete_backward_at_the_root_start_does_nothing() {
    let mut model = MathModel::new(AtomTree::new());
    assert!(!model.delete_backward());
    assert!(!model.delete_selection());
  }

  fn required_branches_are_filled(tree: &AtomTree) -> bool {
    let mut filled = true;
    tree.for_each_descendant(tree.root(), &mut |_, atom| {
      for (branch, children) in atom.branches() {
        if atom.requires_content(branch) && children.len() < 2 {
          filled = false;
        }
      }
    });
    filled
  }

  quickcheck::quickcheck! {
    fn deleting_keeps_required_branches_visible(bytes: Vec<u8>, pick: usize, ops: Vec<u8>) -> bool {
      let tree = arbitrary_filled_tree(&bytes);
      let positions = path::positions(&tree);
      let start = positions[pick % positions.len()].clone();
      let mut model = MathModel::new(tree);
      model.set_path(start, 0);
      ops.into_iter().all(|op| {
        match op % 4 {
          0 => { model.delete_backward(); },
          1 => { model.delete_forward(); },
          2 => { model.next(); },
          _ => { model.extend_selection(crate::Direction::Forward); },
        }
        model.tree().validate().is_ok()
          && path::validate(model.tree(), model.path()).is_ok()
          && required_branches_are_filled(model.tree())
      })
    }
  }
}
