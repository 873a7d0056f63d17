pub mod scope;


pub use scope::{Scope, ScopeId, ScopeTracker, Variable};
