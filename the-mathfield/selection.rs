//! Caret and range selections over a sibling list.
//!
//! A [`Selection`] is an anchor [`Path`] plus a signed `extent`. The focus
//! offset is `anchor + extent`; both ends live in the same sibling list.
//! Selected atoms are the ones strictly after the lower end and up to and
//! including the upper end:
//!
//! ```text
//! siblings: [first, a, b, c]
//! anchor=1, extent=2   -> [b, c]   (forward)
//! anchor=3, extent=-2  -> [b, c]   (backward)
//! anchor=2, extent=0   -> caret after `b`
//! ```

use std::{
  fmt,
  ops::RangeInclusive,
  str::FromStr,
};

use crate::{
  movement::Direction,
  path::{
    Path,
    PathParseError,
  },
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Selection {
  pub path:   Path,
  pub extent: isize,
}

impl Selection {
  pub fn new(path: Path, extent: isize) -> Self {
    Self { path, extent }
  }

  pub fn caret(path: Path) -> Self {
    Self::new(path, 0)
  }

  #[inline]
  pub fn anchor(&self) -> usize {
    self.path.offset()
  }

  #[inline]
  pub fn focus(&self) -> usize {
    self.anchor().saturating_add_signed(self.extent)
  }

  /// Lower end of the selection.
  #[inline]
  pub fn start(&self) -> usize {
    self.anchor().min(self.focus())
  }

  /// Upper end of the selection.
  #[inline]
  pub fn end(&self) -> usize {
    self.anchor().max(self.focus())
  }

  #[inline]
  pub fn is_collapsed(&self) -> bool {
    self.extent == 0
  }

  #[inline]
  pub fn direction(&self) -> Direction {
    if self.extent < 0 {
      Direction::Backward
    } else {
      Direction::Forward
    }
  }

  /// Sibling indices of the selected atoms, `None` for a caret.
  pub fn atom_range(&self) -> Option<RangeInclusive<usize>> {
    (!self.is_collapsed()).then(|| self.start() + 1..=self.end())
  }

  /// The same atoms, anchored at the other end.
  #[must_use]
  pub fn flip(&self) -> Self {
    Self::new(self.path.with_offset(self.focus()), -self.extent)
  }

  /// Caret at the end of the selection that lies in `direction`.
  #[must_use]
  pub fn collapse(&self, direction: Direction) -> Self {
    let offset = match direction {
      Direction::Forward => self.end(),
      Direction::Backward => self.start(),
    };
    Self::caret(self.path.with_offset(offset))
  }
}

/// `path` followed by `#extent` when the selection is not collapsed.
impl fmt::Display for Selection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.path)?;
    if self.extent != 0 {
      write!(f, "#{}", self.extent)?;
    }
    Ok(())
  }
}

impl FromStr for Selection {
  type Err = PathParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (path, extent) = match s.split_once('#') {
      Some((path, extent)) => {
        let extent = extent
          .trim()
          .parse::<isize>()
          .map_err(|_| PathParseError::InvalidExtent(extent.to_string()))?;
        (path, extent)
      },
      None => (s, 0),
    };
    Ok(Self::new(path.parse()?, extent))
  }
}
