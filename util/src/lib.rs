pub mod error;
pub mod grid;
pub mod pos;
pub mod time;
pub mod variant;

pub use bitcode;
