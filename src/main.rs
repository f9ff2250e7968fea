#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod args;

use std::{
  fs::{self, File},
  io::{BufRead, BufReader},
  process::ExitCode,
};

use args::{Args, OutputFormat};
use clap::Parser;
use util::{bitcode, error::CrossfillResult, time::time_fn};
use word_bank::WordBank;
use xword_fill::{solver::Filler, structure::Structure};

fn read_word_list(path: &str) -> CrossfillResult<WordBank> {
  WordBank::parse_word_list(
    BufReader::new(File::open(path)?)
      .lines()
      .collect::<Result<Vec<_>, _>>()?,
  )
}

fn run(args: Args) -> CrossfillResult<ExitCode> {
  let structure = Structure::from_layout(&fs::read_to_string(&args.structure)?)?;
  let bank = read_word_list(&args.words)?;

  let mut filler = Filler::new(structure, bank);
  if args.no_heuristics {
    filler = filler.without_heuristics();
  }

  let (time, assignment) = time_fn(|| filler.fill());
  let Some(assignment) = assignment else {
    eprintln!("No solution exists for this structure and word list");
    return Ok(ExitCode::FAILURE);
  };
  println!("Filled in {}s", time.as_secs_f32());

  let grid = filler.letter_grid(&assignment)?;
  match (&args.output, &args.format) {
    (Some(path), OutputFormat::Text) => fs::write(path, grid.to_string())?,
    (Some(path), OutputFormat::Binary) => fs::write(path, bitcode::encode(&grid))?,
    (None, _) => print!("{grid}"),
  }

  Ok(ExitCode::SUCCESS)
}

fn main() -> CrossfillResult<ExitCode> {
  run(Args::parse())
}
