mod error;
pub mod hint;
mod lexer;
pub mod scanner;


pub use error::*;
pub use lexer::*;
