//! Named child lists of an atom.
//!
//! Every compound atom exposes its children through a small, closed set of
//! [`Branch`]es. A fraction has a numerator and a denominator, a symbol may
//! carry a subscript and a superscript, and an array has one branch per
//! cell. The declaration order of the variants is the forward transition
//! order used when a caret runs off the end of one branch and continues in
//! the next one:
//!
//! ```text
//! body -> numerator -> denominator -> index -> overscript
//!      -> underscript -> subscript -> superscript
//! ```
//!
//! Cells sort after every named branch and among themselves by their
//! row-major index, so `Ord` on [`Branch`] is the traversal order.

use std::{
  borrow::Cow,
  fmt,
  str::FromStr,
};

use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Branch {
  Body,
  Numerator,
  Denominator,
  Index,
  Overscript,
  Underscript,
  Subscript,
  Superscript,
  /// A matrix cell, addressed by its row-major index.
  Cell(usize),
}

/// Named branches in forward transition order.
pub const BRANCH_ORDER: [Branch; 8] = [
  Branch::Body,
  Branch::Numerator,
  Branch::Denominator,
  Branch::Index,
  Branch::Overscript,
  Branch::Underscript,
  Branch::Subscript,
  Branch::Superscript,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BranchParseError {
  #[error("unknown branch name `{0}`")]
  Unknown(String),
  #[error("invalid cell index in `{0}`")]
  InvalidCell(String),
}

impl Branch {
  pub fn name(self) -> Cow<'static, str> {
    match self {
      Self::Body => "body".into(),
      Self::Numerator => "numerator".into(),
      Self::Denominator => "denominator".into(),
      Self::Index => "index".into(),
      Self::Overscript => "overscript".into(),
      Self::Underscript => "underscript".into(),
      Self::Subscript => "subscript".into(),
      Self::Superscript => "superscript".into(),
      Self::Cell(index) => format!("cell{index}").into(),
    }
  }

  /// The named branch that follows this one in transition order.
  ///
  /// Cells have no named successor; array traversal goes through
  /// [`crate::array`] instead.
  pub fn next(self) -> Option<Branch> {
    let index = BRANCH_ORDER.iter().position(|branch| *branch == self)?;
    BRANCH_ORDER.get(index + 1).copied()
  }

  /// The named branch that precedes this one in transition order.
  pub fn previous(self) -> Option<Branch> {
    let index = BRANCH_ORDER.iter().position(|branch| *branch == self)?;
    index.checked_sub(1).map(|index| BRANCH_ORDER[index])
  }

  #[inline]
  pub fn is_cell(self) -> bool {
    matches!(self, Self::Cell(_))
  }

  #[inline]
  pub fn cell_index(self) -> Option<usize> {
    match self {
      Self::Cell(index) => Some(index),
      _ => None,
    }
  }
}

impl fmt::Display for Branch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.name())
  }
}

impl FromStr for Branch {
  type Err = BranchParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let branch = match s {
      "body" => Self::Body,
      "numerator" | "numer" => Self::Numerator,
      "denominator" | "denom" => Self::Denominator,
      "index" => Self::Index,
      "overscript" => Self::Overscript,
      "underscript" => Self::Underscript,
      "subscript" => Self::Subscript,
      "superscript" => Self::Superscript,
      other => {
        let Some(rest) = other.strip_prefix("cell") else {
          return Err(BranchParseError::Unknown(other.to_string()));
        };
        // Both `cell3` and `cell[3]` are accepted.
        let digits = rest
          .strip_prefix('[')
          .and_then(|rest| rest.strip_suffix(']'))
          .unwrap_or(rest);
        let index = digits
          .parse::<usize>()
          .map_err(|_| BranchParseError::InvalidCell(other.to_string()))?;
        Self::Cell(index)
      },
    };
    Ok(branch)
  }
}
