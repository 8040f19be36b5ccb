//! Movement directions for caret and selection operations.

/// The direction of caret movement or selection extension.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
  /// Toward the end of the expression.
  Forward,
  /// Toward the start of the expression.
  Backward,
}

impl Direction {
  #[inline]
  pub const fn signum(self) -> isize {
    match self {
      Self::Forward => 1,
      Self::Backward => -1,
    }
  }

  #[inline]
  #[must_use]
  pub const fn reverse(self) -> Self {
    match self {
      Self::Forward => Self::Backward,
      Self::Backward => Self::Forward,
    }
  }
}

/// Where focus would go when the caret leaves the field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ExitDirection {
  Forward,
  Backward,
  Upward,
  Downward,
}

impl From<Direction> for ExitDirection {
  fn from(direction: Direction) -> Self {
    match direction {
      Direction::Forward => Self::Forward,
      Direction::Backward => Self::Backward,
    }
  }
}
