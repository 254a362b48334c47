//! Weighted tweet length and the validity checks built on it.

mod parser;
pub mod results;
mod validator;

pub use parser::Parser;
pub use results::{ParseResults, ParseResultsRecord, RangeError, TextRange};
pub use validator::Validator;
