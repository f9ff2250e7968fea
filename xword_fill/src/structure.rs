use std::{collections::HashMap, fmt::Display};

use bitcode::{Decode, Encode};
use util::{
  error::{CrossfillError, CrossfillResult},
  grid::{Grid, Gridlike},
  pos::{Diff, Pos},
};

/// One word slot in the grid: a maximal horizontal or vertical run of at
/// least two open cells.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Variable {
  pub pos: Pos,
  pub is_row: bool,
  pub length: u32,
}

impl Variable {
  fn step(&self) -> Diff {
    if self.is_row {
      Diff { x: 1, y: 0 }
    } else {
      Diff { x: 0, y: 1 }
    }
  }

  /// Pairs each letter of `word` with the grid cell it lands on.
  pub fn letter_positions<'a>(&self, word: &'a str) -> impl Iterator<Item = (char, Pos)> + 'a {
    let pos = self.pos;
    let step = self.step();
    word
      .chars()
      .enumerate()
      .map(move |(idx, c)| (c, pos + step * idx as i32))
  }
}

impl Display for Variable {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{} {} of length {}",
      if self.is_row { "across" } else { "down" },
      self.pos,
      self.length
    )
  }
}

/// One rendered cell of a solved (or partially solved) grid.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub enum Tile {
  Letter(char),
  Empty,
  Wall,
}

impl Display for Tile {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{}",
      match self {
        Tile::Letter(c) => *c,
        Tile::Empty => '_',
        Tile::Wall => '█',
      }
    )
  }
}

/// Grid geometry: open/wall cells, the derived variables, and the pairwise
/// overlap relation. Read-only input to the solver.
#[derive(Clone, Debug)]
pub struct Structure {
  grid: Grid<bool>,
  variables: Vec<Variable>,
  overlaps: HashMap<(Variable, Variable), (usize, usize)>,
  neighbors: HashMap<Variable, Vec<Variable>>,
}

impl Structure {
  /// Parses a layout where '_' is an open cell and 'X' is a wall.
  pub fn from_layout(layout: &str) -> CrossfillResult<Self> {
    let (width, height, cells) = layout.lines().try_fold(
      (None, 0, vec![]),
      |(width, height, mut cells), line| -> CrossfillResult<_> {
        let line = line.trim();
        cells.extend(
          line
            .chars()
            .map(|c| match c {
              '_' => Ok(true),
              'X' => Ok(false),
              _ => {
                Err(CrossfillError::Parse(format!("Unrecognized layout character '{c}'")).into())
              }
            })
            .collect::<CrossfillResult<Vec<_>>>()?,
        );
        if let Some(width) = width {
          if line.len() != width {
            return Err(
              CrossfillError::Parse(format!(
                "Layout line lengths differ: {} vs {width}",
                line.len()
              ))
              .into(),
            );
          }
        }

        Ok((Some(line.len()), height + 1, cells))
      },
    )?;

    let width = width.ok_or_else(|| CrossfillError::Parse("Empty layout string".to_owned()))? as u32;
    Ok(Self::from_grid(Grid::from_vec(cells, width, height as u32)?))
  }

  pub fn from_grid(grid: Grid<bool>) -> Self {
    let across = Self::open_runs(&grid).map(|(pos, length)| Variable {
      pos,
      is_row: true,
      length,
    });
    let down = Self::open_runs(grid.transpose()).map(|(pos, length)| Variable {
      pos: pos.transpose(),
      is_row: false,
      length,
    });
    let variables: Vec<_> = across.chain(down).collect();

    let mut overlaps = HashMap::new();
    let mut neighbors: HashMap<_, Vec<_>> = HashMap::new();
    for &a in variables.iter().filter(|var| var.is_row) {
      for &d in variables.iter().filter(|var| !var.is_row) {
        let Diff { x: i, y: j } = d.pos - a.pos;
        let j = -j;
        if (0..a.length as i32).contains(&i) && (0..d.length as i32).contains(&j) {
          overlaps.insert((a, d), (i as usize, j as usize));
          overlaps.insert((d, a), (j as usize, i as usize));
          neighbors.entry(a).or_default().push(d);
          neighbors.entry(d).or_default().push(a);
        }
      }
    }

    Self { grid, variables, overlaps, neighbors }
  }

  /// Maximal runs of open cells per row, as (start, length) pairs. Runs of a
  /// single cell are not word slots and are dropped.
  fn open_runs<'a, G: Gridlike<bool> + 'a>(board: G) -> impl Iterator<Item = (Pos, u32)> + 'a {
    struct OpenRuns<I> {
      x: u32,
      y: u32,
      iter: Option<I>,
    }

    impl<I> Iterator for OpenRuns<I>
    where
      I: Iterator<Item = bool>,
    {
      type Item = (Pos, u32);

      fn next(&mut self) -> Option<(Pos, u32)> {
        let iter = self.iter.as_mut()?;

        loop {
          self.x += 1;
          match iter.next() {
            Some(true) => break,
            Some(false) => {}
            None => return None,
          }
        }
        let pos = Pos { x: (self.x - 1) as i32, y: self.y as i32 };
        let mut length = 1;

        loop {
          self.x += 1;
          match iter.next() {
            Some(true) => length += 1,
            Some(false) => break,
            None => {
              self.iter = None;
              break;
            }
          }
        }

        Some((pos, length))
      }
    }

    (0..board.height())
      .flat_map(move |y| {
        let runs: Vec<_> = OpenRuns {
          x: 0,
          y,
          iter: Some(board.iter_row(y).cloned()),
        }
        .collect();
        runs
      })
      .filter(|&(_, length)| length >= 2)
  }

  pub fn width(&self) -> u32 {
    self.grid.width()
  }

  pub fn height(&self) -> u32 {
    self.grid.height()
  }

  pub fn available(&self, pos: Pos) -> bool {
    self.grid.get(pos).is_some_and(|&available| available)
  }

  pub fn variables(&self) -> &[Variable] {
    &self.variables
  }

  /// The character-index pair shared by `x` and `y`, if the two slots cross:
  /// `x`'s word at index `.0` must equal `y`'s word at index `.1`.
  pub fn overlap(&self, x: Variable, y: Variable) -> Option<(usize, usize)> {
    self.overlaps.get(&(x, y)).copied()
  }

  pub fn neighbors(&self, var: Variable) -> &[Variable] {
    self.neighbors.get(&var).map(Vec::as_slice).unwrap_or(&[])
  }

  /// An unfilled rendering of the structure: walls and empty cells.
  pub fn tile_grid(&self) -> Grid<Tile> {
    self
      .grid
      .map(|&open| if open { Tile::Empty } else { Tile::Wall })
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use googletest::prelude::*;
  use util::pos::Pos;

  use super::{Structure, Variable};

  fn across(x: i32, y: i32, length: u32) -> Variable {
    Variable { pos: Pos { x, y }, is_row: true, length }
  }

  fn down(x: i32, y: i32, length: u32) -> Variable {
    Variable { pos: Pos { x, y }, is_row: false, length }
  }

  #[gtest]
  fn test_empty_layout() {
    expect_that!(Structure::from_layout(""), err(anything()));
  }

  #[gtest]
  fn test_ragged_layout() {
    expect_that!(
      Structure::from_layout(
        "__
         ___"
      ),
      err(anything())
    );
  }

  #[gtest]
  fn test_unknown_character() {
    expect_that!(Structure::from_layout("_Y"), err(anything()));
  }

  #[gtest]
  fn test_available() {
    let structure = Structure::from_layout(
      "__
       X_",
    )
    .unwrap();
    expect_true!(structure.available(Pos { x: 0, y: 0 }));
    expect_true!(structure.available(Pos { x: 1, y: 0 }));
    expect_false!(structure.available(Pos { x: 0, y: 1 }));
    expect_true!(structure.available(Pos { x: 1, y: 1 }));
    expect_false!(structure.available(Pos { x: 2, y: 0 }));
  }

  #[gtest]
  fn test_single_cells_are_not_variables() {
    let structure = Structure::from_layout(
      "__
       X_",
    )
    .unwrap();
    expect_that!(
      structure.variables().to_vec(),
      container_eq([across(0, 0, 2), down(1, 0, 2)])
    );
  }

  #[gtest]
  fn test_variable_derivation() {
    let structure = Structure::from_layout(
      "____
       _XX_
       ____",
    )
    .unwrap();
    expect_that!(
      structure.variables().to_vec(),
      container_eq([
        across(0, 0, 4),
        across(0, 2, 4),
        down(0, 0, 3),
        down(3, 0, 3),
      ])
    );
  }

  #[gtest]
  fn test_overlap_indices() {
    let structure = Structure::from_layout(
      "__
       X_",
    )
    .unwrap();
    let a = across(0, 0, 2);
    let d = down(1, 0, 2);
    expect_that!(structure.overlap(a, d), some(eq((1, 0))));
    expect_that!(structure.overlap(d, a), some(eq((0, 1))));
  }

  #[gtest]
  fn test_no_overlap_for_parallel_runs() {
    let structure = Structure::from_layout(
      "____
       _XX_
       ____",
    )
    .unwrap();
    let top = across(0, 0, 4);
    let bottom = across(0, 2, 4);
    expect_that!(structure.overlap(top, bottom), none());
    expect_that!(structure.overlap(bottom, top), none());
  }

  #[gtest]
  fn test_neighbors() {
    let structure = Structure::from_layout(
      "____
       _XX_
       ____",
    )
    .unwrap();
    let top = across(0, 0, 4);
    let bottom = across(0, 2, 4);
    let left = down(0, 0, 3);
    let right = down(3, 0, 3);

    expect_that!(structure.neighbors(top).to_vec(), container_eq([left, right]));
    expect_that!(structure.neighbors(bottom).to_vec(), container_eq([left, right]));
    expect_that!(structure.neighbors(left).to_vec(), container_eq([top, bottom]));
    expect_that!(structure.neighbors(right).to_vec(), container_eq([top, bottom]));
    expect_that!(
      structure.overlap(bottom, right),
      some(eq((3, 2)))
    );
  }

  #[gtest]
  fn test_letter_positions() {
    let positions: Vec<_> = down(1, 0, 3).letter_positions("cat").collect();
    expect_that!(
      positions,
      container_eq([
        ('c', Pos { x: 1, y: 0 }),
        ('a', Pos { x: 1, y: 1 }),
        ('t', Pos { x: 1, y: 2 }),
      ])
    );
  }
}
