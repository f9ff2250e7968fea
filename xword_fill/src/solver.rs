use std::{
  cmp::Reverse,
  collections::{HashMap, HashSet, VecDeque},
};

use itertools::Itertools;
use util::{
  error::{CrossfillError, CrossfillResult},
  grid::Grid,
  variant::Variant2,
};
use word_bank::WordBank;

use crate::structure::{Structure, Tile, Variable};

/// A partial or complete mapping from slots to the words placed in them.
pub type Assignment = HashMap<Variable, String>;

fn chars_match(word: &str, i: usize, other: &str, j: usize) -> bool {
  match (word.as_bytes().get(i), other.as_bytes().get(j)) {
    (Some(a), Some(b)) => a == b,
    _ => false,
  }
}

/// Per-variable candidate word sets. All removals go through a trail so any
/// suffix of them can be undone exactly, which is what lets the search
/// explore hypothetical prunes and back out of them.
pub struct Domains {
  domains: HashMap<Variable, HashSet<String>>,
  trail: Vec<(Variable, String)>,
}

impl Domains {
  /// Seeds every variable with the full word bank.
  pub fn seed(variables: &[Variable], bank: &WordBank) -> Self {
    let words: HashSet<String> = bank.all_words().map(str::to_owned).collect();
    Self {
      domains: variables.iter().map(|&var| (var, words.clone())).collect(),
      trail: Vec::new(),
    }
  }

  pub fn words(&self, var: Variable) -> impl Iterator<Item = &String> {
    self.domains.get(&var).into_iter().flatten()
  }

  pub fn size(&self, var: Variable) -> usize {
    self.domains.get(&var).map_or(0, HashSet::len)
  }

  pub fn contains(&self, var: Variable, word: &str) -> bool {
    self
      .domains
      .get(&var)
      .is_some_and(|domain| domain.contains(word))
  }

  fn remove(&mut self, var: Variable, word: &str) {
    if let Some(word) = self
      .domains
      .get_mut(&var)
      .and_then(|domain| domain.take(word))
    {
      self.trail.push((var, word));
    }
  }

  /// Drops every candidate for `var` except `word`.
  fn restrict_to(&mut self, var: Variable, word: &str) {
    let others: Vec<_> = self
      .words(var)
      .filter(|other| other.as_str() != word)
      .cloned()
      .collect();
    for other in &others {
      self.remove(var, other);
    }
  }

  /// Current trail position, to be passed to `rollback` later.
  pub fn checkpoint(&self) -> usize {
    self.trail.len()
  }

  /// Reinstates every removal made since `mark`, most recent first.
  pub fn rollback(&mut self, mark: usize) {
    let Self { domains, trail } = self;
    for (var, word) in trail.drain(mark..).rev() {
      domains.entry(var).or_default().insert(word);
    }
  }
}

/// Fills a structure from a word bank: node consistency, then AC-3, then
/// backtracking search over the remaining domains.
pub struct Filler {
  structure: Structure,
  bank: WordBank,
  use_heuristics: bool,
}

impl Filler {
  pub fn new(structure: Structure, bank: WordBank) -> Self {
    Self { structure, bank, use_heuristics: true }
  }

  /// Runs the search in plain derivation/lexicographic order instead of
  /// MRV/LCV order. Same answers, usually more work.
  pub fn without_heuristics(self) -> Self {
    Self { use_heuristics: false, ..self }
  }

  pub fn structure(&self) -> &Structure {
    &self.structure
  }

  /// Attempts a complete fill. `None` means the search space is exhausted
  /// and no solution exists.
  pub fn fill(&self) -> Option<Assignment> {
    let mut domains = Domains::seed(self.structure.variables(), &self.bank);
    self.enforce_node_consistency(&mut domains);
    if !self.ac3(&mut domains, None) {
      return None;
    }

    let mut assignment = Assignment::new();
    self
      .explore(&mut domains, &mut assignment)
      .then_some(assignment)
  }

  /// One-shot fill-and-render.
  pub fn solve(&self) -> CrossfillResult<Grid<Tile>> {
    let assignment = self
      .fill()
      .ok_or_else(|| CrossfillError::Internal("No solution found".to_owned()))?;
    self.letter_grid(&assignment)
  }

  /// Projects an assignment onto the structure's grid.
  pub fn letter_grid(&self, assignment: &Assignment) -> CrossfillResult<Grid<Tile>> {
    let mut grid = self.structure.tile_grid();
    for (var, word) in assignment {
      for (c, pos) in var.letter_positions(word) {
        let tile = grid
          .get_mut(pos)
          .ok_or_else(|| CrossfillError::Internal(format!("Position {pos} is out of bounds")))?;
        match tile {
          Tile::Letter(existing) if *existing != c => {
            return Err(
              CrossfillError::Internal(format!(
                "Conflicting letter assignment at position {pos}: {c} vs {existing}"
              ))
              .into(),
            );
          }
          _ => *tile = Tile::Letter(c),
        }
      }
    }

    Ok(grid)
  }

  /// Removes every word whose length does not match its variable's.
  fn enforce_node_consistency(&self, domains: &mut Domains) {
    for &var in self.structure.variables() {
      let wrong_length: Vec<_> = domains
        .words(var)
        .filter(|word| word.len() != var.length as usize)
        .cloned()
        .collect();
      for word in &wrong_length {
        domains.remove(var, word);
      }
    }
  }

  /// Removes from `x`'s domain every word with no supporting word in `y`'s
  /// domain at their overlap. Reports whether anything was removed.
  fn revise(&self, domains: &mut Domains, x: Variable, y: Variable) -> bool {
    let Some((i, j)) = self.structure.overlap(x, y) else {
      return false;
    };

    let unsupported: Vec<_> = domains
      .words(x)
      .filter(|word| !domains.words(y).any(|other| chars_match(word, i, other, j)))
      .cloned()
      .collect();
    for word in &unsupported {
      domains.remove(x, word);
    }
    !unsupported.is_empty()
  }

  /// Propagates overlap constraints to a fixed point. Starts from the given
  /// arcs, or from every overlapping ordered pair if none are given. Returns
  /// false iff some domain was emptied.
  fn ac3(&self, domains: &mut Domains, initial_arcs: Option<Vec<(Variable, Variable)>>) -> bool {
    let mut queue: VecDeque<_> = match initial_arcs {
      Some(arcs) => arcs.into(),
      None => self
        .structure
        .variables()
        .iter()
        .flat_map(|&x| self.structure.neighbors(x).iter().map(move |&y| (x, y)))
        .collect(),
    };
    let mut queued: HashSet<_> = queue.iter().copied().collect();

    while let Some((x, y)) = queue.pop_front() {
      queued.remove(&(x, y));
      if self.revise(domains, x, y) {
        if domains.size(x) == 0 {
          return false;
        }
        for &z in self.structure.neighbors(x) {
          if z != y && queued.insert((z, x)) {
            queue.push_back((z, x));
          }
        }
      }
    }

    true
  }

  /// Whether placing `word` in `var` agrees with everything already placed:
  /// the word is unused, and every assigned crossing slot matches at the
  /// shared cell. Only `var`'s direct neighbors are consulted.
  fn consistent(&self, assignment: &Assignment, var: Variable, word: &str) -> bool {
    if word.len() != var.length as usize {
      return false;
    }
    if assignment
      .iter()
      .any(|(&other, placed)| other != var && placed.as_str() == word)
    {
      return false;
    }
    self.structure.neighbors(var).iter().all(|&neighbor| {
      match (assignment.get(&neighbor), self.structure.overlap(var, neighbor)) {
        (Some(placed), Some((i, j))) => chars_match(word, i, placed, j),
        _ => true,
      }
    })
  }

  fn unassigned_degree(&self, assignment: &Assignment, var: Variable) -> usize {
    self
      .structure
      .neighbors(var)
      .iter()
      .filter(|&neighbor| !assignment.contains_key(neighbor))
      .count()
  }

  /// Minimum-remaining-values with degree tiebreak. Remaining ties are pinned
  /// to row-major start position, across before down.
  fn select_unassigned_variable(
    &self,
    domains: &Domains,
    assignment: &Assignment,
  ) -> Option<Variable> {
    let mut unassigned = self
      .structure
      .variables()
      .iter()
      .copied()
      .filter(|var| !assignment.contains_key(var));

    if !self.use_heuristics {
      return unassigned.next();
    }
    unassigned.min_by_key(|&var| {
      (
        domains.size(var),
        Reverse(self.unassigned_degree(assignment, var)),
        var.pos.y,
        var.pos.x,
        !var.is_row,
      )
    })
  }

  /// Least-constraining-value order: candidates that eliminate the fewest
  /// words from unassigned neighbors' domains come first, ties broken
  /// lexicographically. Assigned neighbors are the consistency check's
  /// business, not a ranking signal.
  fn order_domain_values(
    &self,
    domains: &Domains,
    assignment: &Assignment,
    var: Variable,
  ) -> impl Iterator<Item = String> {
    if !self.use_heuristics {
      return Variant2::Opt1(domains.words(var).cloned().sorted());
    }

    Variant2::Opt2(
      domains
        .words(var)
        .cloned()
        .map(|word| {
          let eliminated: usize = self
            .structure
            .neighbors(var)
            .iter()
            .filter(|&neighbor| !assignment.contains_key(neighbor))
            .map(|&neighbor| {
              self
                .structure
                .overlap(var, neighbor)
                .map_or(0, |(i, j)| {
                  domains
                    .words(neighbor)
                    .filter(|other| !chars_match(&word, i, other, j))
                    .count()
                })
            })
            .sum();
          (eliminated, word)
        })
        .sorted()
        .map(|(_, word)| word),
    )
  }

  /// Depth-first search for a completion of `assignment`. On success the
  /// assignment holds a complete solution; on failure both the assignment
  /// and the domains are exactly as they were on entry.
  fn explore(&self, domains: &mut Domains, assignment: &mut Assignment) -> bool {
    let Some(var) = self.select_unassigned_variable(domains, assignment) else {
      return true;
    };

    for word in self.order_domain_values(domains, assignment, var) {
      if !self.consistent(assignment, var, &word) {
        continue;
      }

      assignment.insert(var, word.clone());
      let mark = domains.checkpoint();
      domains.restrict_to(var, &word);

      // Placing a word can only invalidate candidates in crossing slots, so
      // re-propagation starts from the arcs pointing at `var`.
      let arcs = self
        .structure
        .neighbors(var)
        .iter()
        .filter(|&neighbor| !assignment.contains_key(neighbor))
        .map(|&neighbor| (neighbor, var))
        .collect();
      if self.ac3(domains, Some(arcs)) && self.explore(domains, assignment) {
        return true;
      }

      domains.rollback(mark);
      assignment.remove(&var);
    }

    false
  }
}
