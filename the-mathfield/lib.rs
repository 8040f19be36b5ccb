//! Caret and selection model for structured math expressions.
//!
//! [`MathModel`] pairs an [`the_atom::AtomTree`] with a [`Selection`] and
//! implements the editing-time behavior on top of it: linear and vertical
//! navigation, placeholder leaps, range resolution from two pointer
//! positions, word selection in text runs and the small amount of tree
//! surgery needed to keep required branches visible.
//!
//! The embedding editor observes the model through a [`NavigationHost`].

pub mod config;
pub mod editing;
pub mod host;
pub mod model;
pub mod movement;
pub mod navigation;
pub mod path;
pub mod placeholder;
pub mod range;
pub mod selection;
pub mod word;

#[cfg(test)]
mod test_trees;

pub use config::{
  ConfigError,
  ModelConfig,
};
pub use host::{
  Announcement,
  NavigationHost,
  NullHost,
};
pub use model::{
  MathModel,
  NotificationScope,
};
pub use movement::{
  Direction,
  ExitDirection,
};
pub use path::{
  Path,
  PathError,
  PathParseError,
  Step,
};
pub use range::RangeOptions;
pub use selection::Selection;
