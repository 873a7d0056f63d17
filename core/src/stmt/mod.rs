mod stmt_impl;
pub mod stmt_parser;


pub use stmt_impl::*;
pub use stmt_parser::{RoutineParser, SqlRoutineParser, StmtParser};
