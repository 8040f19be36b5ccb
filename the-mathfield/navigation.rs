//! Caret navigation.
//!
//! Horizontal movement visits every caret position of the tree in document
//! order: stepping onto a compound atom enters its first navigable branch,
//! the end of a branch continues in the next branch of the same atom and
//! the end of the last branch leaves the atom. At either end of the root
//! the host may take the caret out of the field; otherwise it wraps around.
//!
//! ```text
//! root = [first, x, frac(num = [first, a], den = [first, b])]
//!
//! body:0 -> body:1 -> body:2/numerator:0 -> body:2/numerator:1
//!        -> body:2/denominator:0 -> body:2/denominator:1 -> body:2 -> body:0
//! ```
//!
//! Vertical movement switches between numerator and denominator or between
//! rows of an array. `skip`, `jump` and `leap` move in larger units.

use the_atom::{
  Atom,
  AtomId,
  AtomKind,
  AtomTree,
  Branch,
  array::{
    array_adjust_row,
    array_col_row,
    cell_branch,
    first_cell,
    last_cell,
    next_cell,
    previous_cell,
  },
};

use crate::{
  host::Announcement,
  model::MathModel,
  movement::{
    Direction,
    ExitDirection,
  },
  path::{
    self,
    Path,
  },
  selection::Selection,
  word::word_boundary_offset,
};

// Traversal.
//

/// First (`Forward`) or last (`Backward`) branch the caret may enter.
fn edge_branch(atom: &Atom, direction: Direction) -> Option<Branch> {
  if atom.captures_selection {
    return None;
  }
  if atom.is_array() {
    let cell = match direction {
      Direction::Forward => first_cell(atom),
      Direction::Backward => last_cell(atom),
    };
    return cell.map(Branch::Cell);
  }
  let branches = atom.navigable_branches();
  match direction {
    Direction::Forward => branches.first().copied(),
    Direction::Backward => branches.last().copied(),
  }
}

/// Branch of `atom` visited after (or before) `branch`.
fn adjacent_branch(atom: &Atom, branch: Branch, direction: Direction) -> Option<Branch> {
  if atom.is_array() {
    let index = branch.cell_index()?;
    let cell = match direction {
      Direction::Forward => next_cell(atom, index),
      Direction::Backward => previous_cell(atom, index),
    };
    return cell.map(Branch::Cell);
  }
  let branches = atom.navigable_branches();
  let position = branches.iter().position(|candidate| *candidate == branch)?;
  match direction {
    Direction::Forward => branches.get(position + 1).copied(),
    Direction::Backward => position.checked_sub(1).and_then(|index| branches.get(index).copied()),
  }
}

fn last_offset(tree: &AtomTree, parent: AtomId, branch: Branch) -> usize {
  tree
    .children(parent, branch)
    .map_or(0, |list| list.len().saturating_sub(1))
}

/// The caret position one step from `path` in document order. `None` past
/// either end of the root, or when `path` does not resolve.
pub(crate) fn neighbor(tree: &AtomTree, path: &Path, direction: Direction) -> Option<Path> {
  let siblings = path::siblings_at(tree, path)?;
  let offset = path.offset();

  match direction {
    Direction::Forward if offset + 1 < siblings.len() => {
      let next = path.with_offset(offset + 1);
      let atom = tree.get(siblings[offset + 1])?;
      Some(match edge_branch(atom, Direction::Forward) {
        Some(branch) => next.child(branch, 0),
        None => next,
      })
    },
    Direction::Backward if offset > 0 => {
      let atom_id = siblings[offset];
      let atom = tree.get(atom_id)?;
      Some(match edge_branch(atom, Direction::Backward) {
        Some(branch) => path.child(branch, last_offset(tree, atom_id, branch)),
        None => path.with_offset(offset - 1),
      })
    },
    _ => {
      let parent_path = path.parent()?;
      let parent_id = path::parent_at(tree, path).ok()?;
      let parent = tree.get(parent_id)?;
      match adjacent_branch(parent, path.branch(), direction) {
        Some(branch) => {
          let offset = match direction {
            Direction::Forward => 0,
            Direction::Backward => last_offset(tree, parent_id, branch),
          };
          Some(path.with_branch(branch, offset))
        },
        None => {
          let offset = match direction {
            Direction::Forward => parent_path.offset(),
            Direction::Backward => parent_path.offset().saturating_sub(1),
          };
          Some(parent_path.with_offset(offset))
        },
      }
    },
  }
}

/// End of the balanced fence run starting at `index`, scanning in
/// `direction`.
fn matching_fence(
  tree: &AtomTree,
  siblings: &[AtomId],
  index: usize,
  direction: Direction,
) -> Option<usize> {
  let (opens, closes) = match direction {
    Direction::Forward => (AtomKind::Open, AtomKind::Close),
    Direction::Backward => (AtomKind::Close, AtomKind::Open),
  };
  let candidates: Box<dyn Iterator<Item = usize>> = match direction {
    Direction::Forward => Box::new(index + 1..siblings.len()),
    Direction::Backward => Box::new((1..index).rev()),
  };
  let mut depth = 1usize;
  for candidate in candidates {
    let Some(atom) = tree.get(siblings[candidate]) else {
      continue;
    };
    if atom.is_text() {
      continue;
    }
    if atom.kind == opens {
      depth += 1;
    } else if atom.kind == closes {
      depth -= 1;
      if depth == 0 {
        return Some(candidate);
      }
    }
  }
  None
}

/// Caret offset reached by skipping from the atom at `index`.
fn skip_offset(
  tree: &AtomTree,
  siblings: &[AtomId],
  index: usize,
  direction: Direction,
  match_fences: bool,
) -> usize {
  let one_atom = match direction {
    Direction::Forward => index,
    Direction::Backward => index - 1,
  };
  let Some(atom) = tree.get(siblings[index]) else {
    return one_atom;
  };
  if atom.is_text() {
    return word_boundary_offset(tree, siblings, index, direction);
  }

  let fence = match direction {
    Direction::Forward => AtomKind::Open,
    Direction::Backward => AtomKind::Close,
  };
  if atom.kind == fence {
    if !match_fences {
      return one_atom;
    }
    return match matching_fence(tree, siblings, index, direction) {
      Some(counterpart) if direction == Direction::Forward => counterpart,
      Some(counterpart) => counterpart - 1,
      None => one_atom,
    };
  }

  let same = |candidate: usize| {
    tree
      .get(siblings[candidate])
      .is_some_and(|other| other.kind == atom.kind && !other.is_text())
  };
  let mut end = index;
  match direction {
    Direction::Forward => {
      while end + 1 < siblings.len() && same(end + 1) {
        end += 1;
      }
      end
    },
    Direction::Backward => {
      while end > 1 && same(end - 1) {
        end -= 1;
      }
      end - 1
    },
  }
}

fn exit_direction(downward: bool) -> ExitDirection {
  if downward {
    ExitDirection::Downward
  } else {
    ExitDirection::Upward
  }
}

enum Vertical {
  /// Caret into another branch. `enclosing` addresses the fraction or
  /// array the move stays inside; extending selects it whole.
  Branch { target: Path, enclosing: Option<Path> },
  /// No row in that direction; move linearly instead.
  Fallback(Direction),
}

impl MathModel {
  /// Moves the caret one position forward in document order.
  pub fn next(&mut self) -> bool {
    self.step(Direction::Forward)
  }

  /// Moves the caret one position backward in document order.
  pub fn previous(&mut self) -> bool {
    self.step(Direction::Backward)
  }

  /// Arrow-key movement. A range collapses toward `direction`; with
  /// `extend` the focus moves instead.
  pub fn move_by(&mut self, direction: Direction, extend: bool) -> bool {
    if extend {
      return self.extend_selection(direction);
    }
    if self.selection().is_collapsed() {
      return self.step(direction);
    }
    let previous = self.path().clone();
    let moved = self.collapse(direction);
    if moved {
      self.announce(Announcement::Move, &previous);
    }
    moved
  }

  /// Moves the focus one atom in `direction`. Past the edge of a branch
  /// the whole enclosing atom is selected.
  pub fn extend_selection(&mut self, direction: Direction) -> bool {
    self.ensure_valid();
    let previous = self.path().clone();
    let anchor = self.selection().anchor() as isize;
    let focus = self.selection().focus() as isize + direction.signum();
    let len = self.list_len(&previous) as isize;

    let selection = if (0..len).contains(&focus) {
      Selection::new(previous.clone(), focus - anchor)
    } else if let Some(parent) = previous.parent() {
      let offset = parent.offset();
      match direction {
        Direction::Forward => Selection::new(parent.with_offset(offset - 1), 1),
        Direction::Backward => Selection::new(parent, -1),
      }
    } else {
      self.announce(Announcement::Plonk, &previous);
      return false;
    };

    let extended = self.move_to(selection);
    if extended {
      self.announce(Announcement::Select, &previous);
    }
    extended
  }

  pub fn up(&mut self, extend: bool) -> bool {
    self.vertical(false, extend)
  }

  pub fn down(&mut self, extend: bool) -> bool {
    self.vertical(true, extend)
  }

  /// Moves to the next point of interest: the end of a word in text, the
  /// balanced counterpart of a fence, or the end of a run of atoms of the
  /// same kind.
  pub fn skip(&mut self, direction: Direction, extend: bool) -> bool {
    self.ensure_valid();
    let previous = self.path().clone();
    let focus = self.selection().focus();
    let target = {
      let Some(siblings) = path::siblings_at(self.tree(), &previous) else {
        return false;
      };
      let at_edge = match direction {
        Direction::Forward => focus + 1 >= siblings.len(),
        Direction::Backward => focus == 0,
      };
      if at_edge {
        None
      } else {
        let index = match direction {
          Direction::Forward => focus + 1,
          Direction::Backward => focus,
        };
        let match_fences = self.config().match_fences_on_skip;
        Some(skip_offset(self.tree(), siblings, index, direction, match_fences))
      }
    };
    let Some(target) = target else {
      return self.move_by(direction, extend);
    };
    self.move_within_list(previous, target, extend)
  }

  /// Moves to the first or last offset of the current list.
  pub fn jump(&mut self, direction: Direction, extend: bool) -> bool {
    self.ensure_valid();
    let previous = self.path().clone();
    let target = match direction {
      Direction::Forward => self.list_len(&previous).saturating_sub(1),
      Direction::Backward => 0,
    };
    self.move_within_list(previous, target, extend)
  }

  /// Moves to the first or last offset of the root list. Extending from
  /// inside a compound atom selects that atom too.
  pub fn jump_to_mathfield_boundary(&mut self, direction: Direction, extend: bool) -> bool {
    self.ensure_valid();
    let previous = self.path().clone();
    let target = self.root_edge(direction);

    let selection = if extend {
      let root_offset = previous.steps()[0].offset;
      let anchor = if previous.depth() == 1 {
        self.selection().anchor()
      } else {
        match direction {
          Direction::Forward => root_offset.saturating_sub(1),
          Direction::Backward => root_offset,
        }
      };
      Selection::new(
        Path::at_root(anchor),
        target.offset() as isize - anchor as isize,
      )
    } else {
      Selection::caret(target)
    };

    let moved = self.move_to(selection);
    let event = if extend {
      Announcement::Select
    } else {
      Announcement::Move
    };
    if moved {
      self.announce(event, &previous);
    }
    moved
  }

  /// Moves to the next placeholder (or empty branch) in `direction`,
  /// wrapping around the root. When there is none the selection stays and
  /// the host is offered to tab out of the field.
  pub fn leap(&mut self, direction: Direction) -> bool {
    self.ensure_valid();
    let start = self.path().clone();
    let limit = path::positions(self.tree()).len() + 2;

    let mut cursor = start.clone();
    let mut found = None;
    for _ in 0..limit {
      cursor = match neighbor(self.tree(), &cursor, direction) {
        Some(next) => next,
        None => self.root_edge(direction.reverse()),
      };
      if cursor == start {
        break;
      }
      if self.is_leap_target(&cursor) {
        found = Some(cursor.clone());
        break;
      }
    }
    if found.is_none() && cursor != start {
      tracing::warn!(%start, limit, "leap did not come back to its start");
    }

    let Some(target) = found else {
      tracing::debug!(%start, ?direction, "no placeholder to leap to");
      if !self.consult_tab_out(direction.into()) {
        self.announce(Announcement::Plonk, &start);
      }
      return false;
    };
    let target = self.enter(target, &start);
    let moved = self.move_to(Selection::caret(target));
    if moved {
      self.announce(Announcement::Leap, &start);
    }
    moved
  }

  // Helpers.
  //

  fn step(&mut self, direction: Direction) -> bool {
    self.ensure_valid();
    let previous = self.path().clone();
    let target = match neighbor(self.tree(), &previous, direction) {
      Some(target) => self.enter(target, &previous),
      None => {
        if self.consult_move_out(direction.into()) {
          tracing::debug!(%previous, ?direction, "host took the caret out of the field");
          return false;
        }
        tracing::debug!(%previous, ?direction, "wrapping around");
        self.root_edge(direction.reverse())
      },
    };
    tracing::trace!(from = %previous, to = %target, "step");

    let moved = self.move_to(Selection::caret(target));
    let event = if moved {
      Announcement::Move
    } else {
      Announcement::Plonk
    };
    self.announce(event, &previous);
    moved
  }

  fn vertical(&mut self, downward: bool, extend: bool) -> bool {
    self.ensure_valid();
    let previous = self.path().clone();

    let Some(action) = self.vertical_target(&previous, downward) else {
      self.announce(Announcement::Line, &previous);
      if self.consult_move_out(exit_direction(downward)) {
        tracing::debug!(%previous, downward, "host took the caret out of the field");
      }
      return false;
    };

    let (selection, event) = match action {
      Vertical::Fallback(direction) => return self.move_by(direction, extend),
      Vertical::Branch {
        enclosing: Some(enclosing),
        ..
      } if extend => {
        let offset = enclosing.offset();
        (
          Selection::new(enclosing.with_offset(offset - 1), 1),
          Announcement::Select,
        )
      },
      Vertical::Branch { target, .. } => {
        let target = self.enter(target, &previous);
        let event = if downward {
          Announcement::MoveDown
        } else {
          Announcement::MoveUp
        };
        (Selection::caret(target), event)
      },
    };

    let moved = self.move_to(selection);
    if moved {
      self.announce(event, &previous);
    }
    moved
  }

  /// Innermost ancestor branch with a vertical neighbor.
  fn vertical_target(&self, path: &Path, downward: bool) -> Option<Vertical> {
    for depth in (1..path.depth()).rev() {
      let Ok(prefix) = Path::new(path.steps()[..=depth].iter().copied()) else {
        continue;
      };
      let Ok(parent_id) = path::parent_at(self.tree(), &prefix) else {
        continue;
      };
      let Some(parent) = self.tree().get(parent_id) else {
        continue;
      };
      let into = |branch: Branch| {
        let last = last_offset(self.tree(), parent_id, branch);
        prefix.with_branch(branch, prefix.offset().min(last))
      };

      match (prefix.branch(), downward) {
        (Branch::Numerator, true) | (Branch::Denominator, false) => {
          let other = if downward {
            Branch::Denominator
          } else {
            Branch::Numerator
          };
          if !parent.has_branch(other) {
            continue;
          }
          let enclosing = prefix
            .parent()
            .filter(|_| parent.kind == AtomKind::Fraction);
          return Some(Vertical::Branch {
            target: into(other),
            enclosing,
          });
        },
        (Branch::Cell(index), _) => {
          let Some(shape) = parent.array_shape() else {
            continue;
          };
          let delta = if downward { 1 } else { -1 };
          let target = array_adjust_row(parent, array_col_row(shape, index), delta)
            .and_then(|col_row| cell_branch(shape, col_row));
          return Some(match target {
            Some(branch) => {
              Vertical::Branch {
                target:    into(branch),
                enclosing: prefix.parent(),
              }
            },
            None if downward => Vertical::Fallback(Direction::Forward),
            None => Vertical::Fallback(Direction::Backward),
          });
        },
        _ => {},
      }
    }
    None
  }

  /// Caret or focus move to `target` inside the list `previous` ends in.
  fn move_within_list(&mut self, previous: Path, target: usize, extend: bool) -> bool {
    let selection = if extend {
      let anchor = self.selection().anchor() as isize;
      Selection::new(previous.clone(), target as isize - anchor)
    } else {
      Selection::caret(previous.with_offset(target))
    };
    let moved = self.move_to(selection);
    if moved {
      let event = if extend {
        Announcement::Select
      } else {
        Announcement::Move
      };
      self.announce(event, &previous);
    }
    moved
  }

  /// Applies the placeholder-on-entry rule to a caret arriving at `target`
  /// from another list.
  pub(crate) fn enter(&mut self, target: Path, previous: &Path) -> Path {
    if !self.config().placeholder_on_entry || target.is_sibling_of(previous) {
      return target;
    }
    if self.ensure_placeholder(&target) {
      target.with_offset(1)
    } else {
      target
    }
  }

  fn is_leap_target(&self, path: &Path) -> bool {
    let on_placeholder = path::resolve(self.tree(), path)
      .and_then(|id| self.tree().get(id))
      .is_some_and(Atom::is_placeholder);
    on_placeholder
      || (self.config().leap_into_empty_branches
        && path.depth() > 1
        && self.list_len(path) == 1)
  }

  fn ensure_valid(&mut self) {
    if path::validate(self.tree(), self.path()).is_err() {
      self.revalidate();
    }
  }
}
