//! Expression trees and a recording host shared by the unit tests.

use std::{
  cell::RefCell,
  rc::Rc,
};

use the_atom::{
  Atom,
  AtomId,
  AtomKind,
  AtomTree,
  Branch,
};

use crate::{
  host::{
    Announcement,
    NavigationHost,
  },
  movement::ExitDirection,
  path::Path,
};

pub(crate) fn ord(tree: &mut AtomTree, value: &str) -> AtomId {
  tree.symbol(AtomKind::Ordinary, value)
}

/// `x` followed by a fraction with an empty numerator over `2`.
pub(crate) fn empty_numerator() -> (AtomTree, AtomId) {
  let mut tree = AtomTree::new();
  let x = ord(&mut tree, "x");
  let two = ord(&mut tree, "2");
  let fraction = tree.fraction(vec![], vec![two]);
  tree.append_root(vec![x, fraction]);
  (tree, fraction)
}

/// `x` followed by `a/b`.
pub(crate) fn simple_fraction() -> (AtomTree, AtomId) {
  let mut tree = AtomTree::new();
  let x = ord(&mut tree, "x");
  let a = ord(&mut tree, "a");
  let b = ord(&mut tree, "b");
  let fraction = tree.fraction(vec![a], vec![b]);
  tree.append_root(vec![x, fraction]);
  (tree, fraction)
}

/// A lone 2x2 matrix `[A, B; C, D]`.
pub(crate) fn matrix() -> (AtomTree, AtomId) {
  let mut tree = AtomTree::new();
  let cells: Vec<Vec<Option<Vec<AtomId>>>> = [["A", "B"], ["C", "D"]]
    .into_iter()
    .map(|row| {
      row
        .into_iter()
        .map(|value| Some(vec![ord(&mut tree, value)]))
        .collect()
    })
    .collect();
  let array = tree.array(cells);
  tree.append_root(vec![array]);
  (tree, array)
}

pub(crate) fn text(value: &str) -> AtomTree {
  let mut tree = AtomTree::new();
  let run = tree.text_run(value);
  tree.append_root(run);
  tree
}

/// `a + b/(c + sqrt(⬚))`, the only placeholder three levels down.
pub(crate) fn nested_placeholder() -> (AtomTree, AtomId) {
  let mut tree = AtomTree::new();
  let a = ord(&mut tree, "a");
  let plus = tree.symbol(AtomKind::Binary, "+");
  let b = ord(&mut tree, "b");
  let c = ord(&mut tree, "c");
  let plus_inner = tree.symbol(AtomKind::Binary, "+");
  let placeholder = tree.placeholder();
  let radical = tree.radical(None, vec![placeholder]);
  let fraction = tree.fraction(vec![b], vec![c, plus_inner, radical]);
  tree.append_root(vec![a, plus, fraction]);
  (tree, placeholder)
}

pub(crate) fn placeholders_in(tree: &AtomTree, list: &[AtomId]) -> usize {
  list
    .iter()
    .filter(|id| tree.get(**id).is_some_and(Atom::is_placeholder))
    .count()
}

// Recording host.
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HostEvent {
  SelectionWillChange,
  SelectionDidChange,
  ContentWillChange,
  ContentDidChange,
  Announce(Announcement, String),
  MoveOut(ExitDirection),
  TabOut(ExitDirection),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingHost {
  events:     Rc<RefCell<Vec<HostEvent>>>,
  allow_exit: bool,
}

impl RecordingHost {
  /// A host that approves every request to leave the field.
  pub(crate) fn exiting() -> Self {
    Self {
      allow_exit: true,
      ..Self::default()
    }
  }

  pub(crate) fn take(&self) -> Vec<HostEvent> {
    std::mem::take(&mut *self.events.borrow_mut())
  }

  fn push(&self, event: HostEvent) {
    self.events.borrow_mut().push(event);
  }
}

impl NavigationHost for RecordingHost {
  fn selection_will_change(&mut self) {
    self.push(HostEvent::SelectionWillChange);
  }

  fn selection_did_change(&mut self) {
    self.push(HostEvent::SelectionDidChange);
  }

  fn content_will_change(&mut self) {
    self.push(HostEvent::ContentWillChange);
  }

  fn content_did_change(&mut self) {
    self.push(HostEvent::ContentDidChange);
  }

  fn announce(&mut self, event: Announcement, _previous: &Path, current: &Path) {
    self.push(HostEvent::Announce(event, current.to_string()));
  }

  fn move_out(&mut self, direction: ExitDirection) -> bool {
    self.push(HostEvent::MoveOut(direction));
    self.allow_exit
  }

  fn tab_out(&mut self, direction: ExitDirection) -> bool {
    self.push(HostEvent::TabOut(direction));
    self.allow_exit
  }
}

// Generated trees.
//

const MAX_DEPTH: usize = 3;

/// Builds an expression from arbitrary bytes. Every atom shape shows up:
/// empty required branches, atoms that capture the selection, operators
/// and script carriers with a scaffolding body, over/under annotations
/// and sparse arrays.
pub(crate) fn arbitrary_tree(bytes: &[u8]) -> AtomTree {
  let mut builder = Builder {
    tree:  AtomTree::new(),
    bytes: bytes.iter(),
  };
  let mut children = Vec::new();
  while let Some(atom) = builder.atom(0) {
    children.push(atom);
  }
  builder.tree.append_root(children);
  builder.tree
}

/// [`arbitrary_tree`] with a placeholder in every empty required branch.
pub(crate) fn arbitrary_filled_tree(bytes: &[u8]) -> AtomTree {
  let mut tree = arbitrary_tree(bytes);
  let mut empty = Vec::new();
  tree.for_each_descendant(tree.root(), &mut |id, atom| {
    for (branch, children) in atom.branches() {
      if atom.requires_content(branch) && children.len() == 1 {
        empty.push((id, branch));
      }
    }
  });
  for (id, branch) in empty {
    let placeholder = tree.placeholder();
    tree
      .insert_children(id, branch, 1, [placeholder])
      .expect("empty branch takes a placeholder");
  }
  tree
}

struct Builder<'a> {
  tree:  AtomTree,
  bytes: std::slice::Iter<'a, u8>,
}

impl Builder<'_> {
  fn list(&mut self, depth: usize) -> Vec<AtomId> {
    let len = self.bytes.next().map_or(0, |byte| usize::from(*byte % 4));
    (0..len).filter_map(|_| self.atom(depth)).collect()
  }

  /// Content for a branch that must show something; sometimes left empty,
  /// sometimes holding only a placeholder.
  fn required(&mut self, depth: usize) -> Vec<AtomId> {
    let mut list = self.list(depth);
    if list.is_empty() && self.bytes.next().is_some_and(|byte| byte & 1 == 0) {
      list.push(self.tree.placeholder());
    }
    list
  }

  fn with_scripts(&mut self, base: AtomId, byte: u8, depth: usize) {
    let subscript = (byte & 0x10 != 0).then(|| self.list(depth + 1));
    let superscript = (byte & 0x20 != 0 || subscript.is_none()).then(|| self.list(depth + 1));
    self
      .tree
      .attach_scripts(base, subscript, superscript)
      .expect("base is part of the tree");
  }

  fn atom(&mut self, depth: usize) -> Option<AtomId> {
    let byte = *self.bytes.next()?;
    let nested = depth < MAX_DEPTH;
    let atom = match byte % 16 {
      5 if nested => {
        let numerator = self.required(depth + 1);
        let denominator = self.required(depth + 1);
        self.tree.fraction(numerator, denominator)
      },
      6 if nested => {
        let index = (byte & 0x10 != 0).then(|| self.list(depth + 1));
        let body = self.required(depth + 1);
        self.tree.radical(index, body)
      },
      7 if nested => {
        let base = ord(&mut self.tree, "s");
        self.with_scripts(base, byte, depth);
        base
      },
      8 if nested => {
        let body = self.list(depth + 1);
        self.tree.left_right("(", ")", body)
      },
      9 if nested => {
        let sparse = byte & 0x10 != 0;
        let first = Some(self.list(depth + 1));
        let second = (!sparse).then(|| self.list(depth + 1));
        let third = Some(self.list(depth + 1));
        let fourth = Some(self.list(depth + 1));
        self
          .tree
          .array(vec![vec![first, second], vec![third, fourth]])
      },
      12 if nested => {
        let body = self.required(depth + 1);
        let over = (byte & 0x10 != 0).then(|| self.required(depth + 1));
        let under = (byte & 0x20 != 0).then(|| self.required(depth + 1));
        self.tree.over_under(body, over, under)
      },
      13 if nested => {
        let kind = if byte & 0x40 == 0 {
          AtomKind::Operator
        } else {
          AtomKind::Scripts
        };
        let carrier = self.tree.symbol(kind, "\u{2211}");
        let body = self.list(depth + 1);
        self
          .tree
          .set_branch(carrier, Branch::Body, body)
          .expect("carrier is part of the tree");
        self.with_scripts(carrier, byte, depth);
        carrier
      },
      14 if nested => {
        let numerator = self.required(depth + 1);
        let denominator = self.required(depth + 1);
        let captured = self.tree.fraction(numerator, denominator);
        if let Some(atom) = self.tree.get_mut(captured) {
          atom.captures_selection = true;
        }
        captured
      },
      10 => self.tree.placeholder(),
      11 => {
        let value = ["a", "b", " ", ","][usize::from(byte >> 6)];
        self.tree.insert(Atom::text(value))
      },
      4 => self.tree.symbol(AtomKind::Open, "("),
      3 => self.tree.symbol(AtomKind::Close, ")"),
      2 => self.tree.symbol(AtomKind::Binary, "+"),
      _ => ord(&mut self.tree, "x"),
    };
    Some(atom)
  }
}
