//! Hooks the embedding editor provides to the model.
//!
//! The model does not render, speak or manage focus. It tells the host what
//! happened through a [`NavigationHost`] and asks it whether the caret may
//! leave the field. Every callback is synchronous.

use crate::{
  movement::ExitDirection,
  path::Path,
};

/// Accessibility events reported through [`NavigationHost::announce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Announcement {
  Move,
  MoveUp,
  MoveDown,
  /// Vertical move with nowhere to go inside the field.
  Line,
  Leap,
  /// The caret could not move.
  Plonk,
  Insert,
  Delete,
  Select,
}

pub trait NavigationHost {
  fn selection_will_change(&mut self) {}

  fn selection_did_change(&mut self) {}

  fn content_will_change(&mut self) {}

  fn content_did_change(&mut self) {}

  fn announce(&mut self, _event: Announcement, _previous: &Path, _current: &Path) {}

  /// The caret is about to run off the field in `direction`. Return `true`
  /// to let it leave (the host moves focus elsewhere and the selection is
  /// left as is) or `false` to keep it inside, in which case horizontal
  /// navigation wraps around.
  fn move_out(&mut self, _direction: ExitDirection) -> bool {
    false
  }

  /// Like [`NavigationHost::move_out`], for leaps that found no
  /// placeholder.
  fn tab_out(&mut self, _direction: ExitDirection) -> bool {
    false
  }
}

/// Host that ignores every notification and never lets the caret leave.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl NavigationHost for NullHost {}
