use core::fmt;
use std::{
  error::Error,
  fmt::{Display, Formatter},
};

#[derive(Debug)]
pub enum CrossfillError {
  Internal(String),
  Parse(String),
}

impl Display for CrossfillError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      CrossfillError::Internal(msg) => write!(f, "Internal error: {msg}"),
      CrossfillError::Parse(msg) => write!(f, "Parse error: {msg}"),
    }
  }
}

impl Error for CrossfillError {}

pub type CrossfillResult<T = ()> = Result<T, Box<dyn Error>>;
