//! Word boundaries inside runs of text-mode atoms.
//!
//! Each text atom is classified by the first character of its value (see
//! [`the_atom::chars::word_class`]). Extending from an atom:
//!
//! - a word atom covers the run of word atoms around it,
//! - a whitespace atom covers its whitespace run plus the adjoining run of
//!   non-whitespace text,
//! - a punctuation atom covers everything up to the next whitespace.
//!
//! Math-mode atoms are words of their own.

use the_atom::{
  Atom,
  AtomId,
  AtomTree,
  chars::{
    WordClass,
    word_class,
  },
};

use crate::{
  model::MathModel,
  movement::Direction,
  path::{
    self,
    Path,
  },
};

fn class_of(tree: &AtomTree, id: AtomId) -> Option<WordClass> {
  tree
    .get(id)
    .filter(|atom| atom.is_text() && !atom.is_first())
    .map(|atom: &Atom| word_class(&atom.value))
}

// Each class consumes these runs, in order.
const WORD_RUNS: &[fn(WordClass) -> bool] = &[is_word];
const WHITESPACE_RUNS: &[fn(WordClass) -> bool] = &[is_space, not_space];
const PUNCTUATION_RUNS: &[fn(WordClass) -> bool] = &[not_space];

fn is_word(class: WordClass) -> bool {
  class == WordClass::Word
}

fn is_space(class: WordClass) -> bool {
  class == WordClass::Whitespace
}

fn not_space(class: WordClass) -> bool {
  class != WordClass::Whitespace
}

/// Caret offset at the end (`Forward`) or start (`Backward`) of the word
/// containing `siblings[atom_index]`.
pub fn word_boundary_offset(
  tree: &AtomTree,
  siblings: &[AtomId],
  atom_index: usize,
  direction: Direction,
) -> usize {
  if atom_index == 0 || atom_index >= siblings.len() {
    return atom_index.min(siblings.len().saturating_sub(1));
  }
  let at = |index: usize| class_of(tree, siblings[index]);
  let Some(class) = at(atom_index) else {
    return match direction {
      Direction::Forward => atom_index,
      Direction::Backward => atom_index - 1,
    };
  };

  let runs = match class {
    WordClass::Word => WORD_RUNS,
    WordClass::Whitespace => WHITESPACE_RUNS,
    WordClass::Punctuation => PUNCTUATION_RUNS,
  };

  let mut index = atom_index;
  match direction {
    Direction::Forward => {
      for run in runs {
        while index + 1 < siblings.len() && at(index + 1).is_some_and(*run) {
          index += 1;
        }
      }
      index
    },
    Direction::Backward => {
      for run in runs {
        while index > 1 && at(index - 1).is_some_and(*run) {
          index -= 1;
        }
      }
      index - 1
    },
  }
}

impl MathModel {
  /// Caret position at the word boundary next to the caret at `path`.
  /// Paths that do not resolve are returned unchanged.
  pub fn word_boundary(&self, path: &Path, direction: Direction) -> Path {
    let Some(siblings) = path::siblings_at(self.tree(), path) else {
      return path.clone();
    };
    let offset = path.offset();
    let atom_index = match direction {
      Direction::Forward if offset + 1 < siblings.len() => offset + 1,
      Direction::Backward if offset > 0 => offset,
      _ => return path.clone(),
    };
    path.with_offset(word_boundary_offset(self.tree(), siblings, atom_index, direction))
  }
}
