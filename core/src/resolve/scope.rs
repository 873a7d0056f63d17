//! Lexical scopes of a stored routine.
//!
//! Parameters live in the root scope; every BEGIN ... END block the analyzer
//! enters gets a child scope holding its DECLAREd variables. Scopes are kept
//! in an arena owned by the [`ScopeTracker`] and referred to by [`ScopeId`],
//! so a recorded insertion point can keep pointing at its scope after the walk
//! has left it.

use crate::stmt::{ParamDecl, ParamDirection};
use rustc_hash::{FxHashMap, FxHashSet};

/// Index of a scope inside the tracker that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

/// A routine parameter or a local variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    /// Parameter mode; `None` for locals and function parameters.
    pub direction: Option<ParamDirection>,
    pub data_type: String,
}

impl Variable {
    pub fn local(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: None,
            data_type: data_type.into(),
        }
    }
}

impl From<&ParamDecl> for Variable {
    fn from(param: &ParamDecl) -> Self {
        Self {
            name: param.name.clone(),
            direction: param.direction,
            data_type: param.data_type.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Scope {
    parent: Option<ScopeId>,
    label: Option<String>,
    variables: Vec<Variable>,
    // name -> position in `variables`; names are case-sensitive
    by_name: FxHashMap<String, usize>,
}

impl Scope {
    fn new(parent: Option<ScopeId>, label: Option<String>) -> Self {
        Self {
            parent,
            label,
            ..Self::default()
        }
    }

    /// A redeclaration in the same scope replaces the earlier entry in place.
    fn declare(&mut self, var: Variable) {
        match self.by_name.get(&var.name) {
            Some(&idx) => self.variables[idx] = var,
            None => {
                self.by_name.insert(var.name.clone(), self.variables.len());
                self.variables.push(var);
            }
        }
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Variables declared directly in this scope, in declaration order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.by_name.get(name).map(|&idx| &self.variables[idx])
    }
}

#[derive(Debug)]
pub struct ScopeTracker {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl ScopeTracker {
    /// Create a tracker whose root scope holds `params`.
    pub fn new(params: impl IntoIterator<Item = Variable>) -> Self {
        let mut root = Scope::new(None, None);
        for param in params {
            root.declare(param);
        }
        Self {
            scopes: vec![root],
            current: ScopeId(0),
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn current_scope(&self) -> ScopeId {
        self.current
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0)
    }

    /// The root scope's variables.
    pub fn parameters(&self) -> &[Variable] {
        &self.scopes[0].variables
    }

    /// Open a child of the current scope seeded with `declared` and make it current.
    pub fn enter_block(&mut self, label: Option<&str>, declared: impl IntoIterator<Item = Variable>) -> ScopeId {
        let mut scope = Scope::new(Some(self.current), label.map(str::to_string));
        for var in declared {
            scope.declare(var);
        }
        let id = ScopeId(self.scopes.len());
        self.scopes.push(scope);
        self.current = id;
        id
    }

    /// Return to the parent scope; does nothing at the root.
    pub fn leave_block(&mut self) {
        if let Some(parent) = self.scopes[self.current.0].parent {
            self.current = parent;
        }
    }

    fn chain(&self, start: ScopeId) -> impl Iterator<Item = &Scope> {
        std::iter::successors(self.scope(start), |scope| scope.parent.and_then(|p| self.scope(p)))
    }

    /// Resolve `name` from `scope`; the nearest declaration wins.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Variable> {
        self.chain(scope).find_map(|s| s.get(name))
    }

    /// Every variable visible from `scope`, nearest scope first and in
    /// declaration order within a scope. Shadowed names appear once.
    pub fn all_visible(&self, scope: ScopeId) -> Vec<&Variable> {
        let mut seen = FxHashSet::default();
        self.chain(scope)
            .flat_map(|s| s.variables.iter())
            .filter(|var| seen.insert(var.name.as_str()))
            .collect()
    }

    /// Visible variables minus anything named like one of `params`.
    pub fn visible_locals(&self, scope: ScopeId, params: &[Variable]) -> Vec<&Variable> {
        let param_names: FxHashSet<&str> = params.iter().map(|p| p.name.as_str()).collect();
        self.all_visible(scope)
            .into_iter()
            .filter(|var| !param_names.contains(var.name.as_str()))
            .collect()
    }
}
