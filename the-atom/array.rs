//! Cell indexing for array and matrix atoms.
//!
//! Cells are stored as [`Branch::Cell`] branches keyed by their row-major
//! index `row * columns + column`. Arrays may be sparse or irregular: a
//! short row simply has no branch for its missing columns.

use serde::{
  Deserialize,
  Serialize,
};

use crate::{
  AtomId,
  atom::Atom,
  branch::Branch,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrayShape {
  pub rows:    usize,
  pub columns: usize,
}

impl ArrayShape {
  pub const fn new(rows: usize, columns: usize) -> Self {
    Self { rows, columns }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColRow {
  pub col: usize,
  pub row: usize,
}

impl ColRow {
  pub const fn new(col: usize, row: usize) -> Self {
    Self { col, row }
  }
}

#[inline]
pub fn array_cell_count(shape: ArrayShape) -> usize {
  shape.rows * shape.columns
}

/// Row-major index of `col_row`, or `None` when it lies outside the shape.
pub fn array_index(shape: ArrayShape, col_row: ColRow) -> Option<usize> {
  (col_row.col < shape.columns && col_row.row < shape.rows)
    .then(|| col_row.row * shape.columns + col_row.col)
}

/// Column and row of a row-major cell index.
pub fn array_col_row(shape: ArrayShape, index: usize) -> ColRow {
  let columns = shape.columns.max(1);
  ColRow::new(index % columns, index / columns)
}

pub fn cell_branch(shape: ArrayShape, col_row: ColRow) -> Option<Branch> {
  array_index(shape, col_row).map(Branch::Cell)
}

/// Column and row addressed by a cell branch.
pub fn branch_col_row(shape: ArrayShape, branch: Branch) -> Option<ColRow> {
  let index = branch.cell_index()?;
  (index < array_cell_count(shape)).then(|| array_col_row(shape, index))
}

/// Children of the cell at `index`, sentinel included. `None` for cells
/// missing from a sparse array.
pub fn array_cell(atom: &Atom, index: usize) -> Option<&[AtomId]> {
  let shape = atom.array_shape()?;
  if index >= array_cell_count(shape) {
    return None;
  }
  atom.branch(Branch::Cell(index))
}

#[inline]
fn has_cell(atom: &Atom, index: usize) -> bool {
  array_cell(atom, index).is_some()
}

pub fn first_cell(atom: &Atom) -> Option<usize> {
  let shape = atom.array_shape()?;
  (0..array_cell_count(shape)).find(|index| has_cell(atom, *index))
}

pub fn last_cell(atom: &Atom) -> Option<usize> {
  let shape = atom.array_shape()?;
  (0..array_cell_count(shape))
    .rev()
    .find(|index| has_cell(atom, *index))
}

/// First existing cell after `index` in row-major order.
pub fn next_cell(atom: &Atom, index: usize) -> Option<usize> {
  let shape = atom.array_shape()?;
  (index + 1..array_cell_count(shape)).find(|index| has_cell(atom, *index))
}

/// Last existing cell before `index` in row-major order.
pub fn previous_cell(atom: &Atom, index: usize) -> Option<usize> {
  (0..index).rev().find(|index| has_cell(atom, *index))
}

/// Nearest existing cell in the row above (`delta < 0`) or below
/// (`delta > 0`) of `col_row`.
///
/// The same column is preferred; otherwise the closest column wins, left
/// before right on ties. Rows without any cell are skipped. Returns `None`
/// when the array has no row in that direction.
pub fn array_adjust_row(atom: &Atom, col_row: ColRow, delta: isize) -> Option<ColRow> {
  let shape = atom.array_shape()?;
  if delta == 0 {
    return has_cell(atom, array_index(shape, col_row)?).then_some(col_row);
  }

  let mut row = col_row.row;
  loop {
    row = row.checked_add_signed(delta.signum())?;
    if row >= shape.rows {
      return None;
    }
    if let Some(col) = nearest_column(atom, shape, row, col_row.col) {
      return Some(ColRow::new(col, row));
    }
  }
}

fn nearest_column(atom: &Atom, shape: ArrayShape, row: usize, col: usize) -> Option<usize> {
  let exists = |col: usize| {
    array_index(shape, ColRow::new(col, row)).is_some_and(|index| has_cell(atom, index))
  };
  if exists(col) {
    return Some(col);
  }
  for distance in 1..shape.columns.max(col + 1) {
    if let Some(left) = col.checked_sub(distance)
      && exists(left)
    {
      return Some(left);
    }
    if exists(col + distance) {
      return Some(col + distance);
    }
  }
  None
}
