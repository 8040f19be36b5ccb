//! Turning two caret positions into a selection.
//!
//! Pointer drags and shift-clicks produce a pair of paths that may sit at
//! different depths. A selection always lives in one sibling list, so the
//! pair is lifted to the deepest list that contains both:
//!
//! ```text
//! root = [first, x, frac(num = [first, a], den = [first, b])]
//!
//! body:1 .. body:2                    -> body:1#1   (the fraction)
//! body:1 .. body:2/numerator:1        -> body:1#1   (the fraction)
//! body:2/numerator:1 .. .../denominator:0 -> body:2 (caret)
//! ```
//!
//! An endpoint that is deeper than the common list stands for the whole
//! atom it is inside of, so both `set_range(a, b)` and `set_range(b, a)`
//! select the same atoms.

use the_atom::AtomId;

use crate::{
  host::Announcement,
  model::MathModel,
  movement::Direction,
  path::{
    self,
    Path,
    Step,
    common_ancestor,
  },
  selection::Selection,
  word::word_boundary_offset,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RangeOptions {
  /// Grow both ends to the enclosing word (double-click selection).
  pub extend_to_word_boundary: bool,
}

impl MathModel {
  /// Selects from `from` to `to`. Returns whether the selection changed.
  pub fn set_range(&mut self, from: &Path, to: &Path, options: RangeOptions) -> bool {
    for endpoint in [from, to] {
      if let Err(err) = path::validate(self.tree(), endpoint) {
        tracing::warn!(%err, path = %endpoint, "invalid range endpoint, resetting");
        self.reset_to_root();
        return false;
      }
    }

    let previous = self.path().clone();
    let selection = self.resolve_range(from, to, options);
    let collapsed = selection.is_collapsed();
    let changed = self.move_to(selection);
    if changed && !collapsed {
      self.announce(Announcement::Select, &previous);
    }
    changed
  }

  fn resolve_range(&self, from: &Path, to: &Path, options: RangeOptions) -> Selection {
    let words = options.extend_to_word_boundary;

    if from == to {
      return match self.siblings_of(from).filter(|_| words) {
        Some(siblings) => {
          let atom = from.offset().max(1);
          if atom >= siblings.len() {
            return Selection::caret(from.clone());
          }
          let anchor = word_boundary_offset(self.tree(), siblings, atom, Direction::Backward);
          let focus = word_boundary_offset(self.tree(), siblings, atom, Direction::Forward);
          Selection::new(from.with_offset(anchor), focus as isize - anchor as isize)
        },
        None => Selection::caret(from.clone()),
      };
    }

    if from.is_sibling_of(to) {
      let (mut anchor, mut focus) = (from.offset(), to.offset());
      if let Some(siblings) = self.siblings_of(from).filter(|_| words) {
        let tree = self.tree();
        if anchor < focus {
          anchor = word_boundary_offset(tree, siblings, anchor + 1, Direction::Backward);
          focus = word_boundary_offset(tree, siblings, focus, Direction::Forward);
        } else {
          anchor = word_boundary_offset(tree, siblings, anchor, Direction::Forward);
          focus = word_boundary_offset(tree, siblings, focus + 1, Direction::Backward);
        }
      }
      return Selection::new(from.with_offset(anchor), focus as isize - anchor as isize);
    }

    let ancestor = common_ancestor(from, to);
    let depth = ancestor.len();
    let diverging = from.depth() == depth
      || to.depth() == depth
      || from.steps()[depth].branch != to.steps()[depth].branch;
    if diverging {
      return Selection::caret(Path::new(ancestor.iter().copied()).unwrap_or_default());
    }

    // A leaf endpoint is a boundary; a deeper one covers the atom it is in.
    let interval = |path: &Path| {
      let offset = path.steps()[depth].offset;
      if path.depth() == depth + 1 {
        (offset, offset)
      } else {
        (offset - 1, offset)
      }
    };
    let (from_low, from_high) = interval(from);
    let (to_low, to_high) = interval(to);
    let (low, high) = (from_low.min(to_low), from_high.max(to_high));
    let (anchor, focus) = if from_low <= to_low {
      (low, high)
    } else {
      (high, low)
    };

    let branch = from.steps()[depth].branch;
    let list = Path::new(ancestor.iter().copied().chain([Step::new(branch, anchor)]))
      .unwrap_or_default();
    Selection::new(list, focus as isize - anchor as isize)
  }

  fn siblings_of(&self, path: &Path) -> Option<&[AtomId]> {
    path::siblings_at(self.tree(), path)
  }
}
