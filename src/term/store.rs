/*!

A `TermStore` is an append-only arena of canonical nodes. Every node enters through `TermStore::intern`, which
returns the existing node if a structurally equal one is already present. Structural equality is one level deep:
children are compared by identity, which is sound because children are themselves canonical.

Positions are assigned in insertion order, so a node's children always have smaller positions than the node itself.

*/

use fnv::FnvHashMap;

use crate::{
  interner::{interned, InternedString},
  logging::{Channel, log},
};

use super::{Children, Literal, RawTerm, ScopeId, Term, TermKind};


pub struct TermStore {
  scope: ScopeId,
  nodes: Vec<Term>,
  index: FnvHashMap<TermKind, Term>,
}

impl Default for TermStore {
  fn default() -> Self {
    TermStore::new()
  }
}

impl TermStore {
  pub fn new() -> TermStore {
    TermStore {
      scope: ScopeId::fresh(),
      nodes: Vec::new(),
      index: FnvHashMap::default(),
    }
  }

  pub fn scope(&self) -> ScopeId {
    self.scope
  }

  /// The number of distinct nodes in the store.
  pub fn size(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// True if `term` is a node of this store.
  pub fn contains(&self, term: &Term) -> bool {
    term.scope() == self.scope
  }

  /// The nodes in position order.
  pub fn nodes(&self) -> &[Term] {
    &self.nodes
  }

  /// The canonicalizing constructor. Returns the node structurally equal to `kind` if there is one, otherwise
  /// appends a new node. Every child of `kind` must already belong to this store.
  pub fn intern(&mut self, kind: TermKind) -> Term {
    assert!(
      kind.children().iter().all(|child| self.contains(child)),
      "children of a term must belong to the store it is created in"
    );

    if let Some(existing) = self.index.get(&kind) {
      debug_assert!(kind.search_hint().map_or(true, |hint| existing.position() > hint));
      return existing.clone();
    }

    let term = Term::new(kind.clone(), self.scope, self.nodes.len());
    self.nodes.push(term.clone());
    self.index.insert(kind, term.clone());
    term
  }

  // region Constructors

  pub fn var(&mut self, name: &str) -> Term {
    self.intern(TermKind::Var(interned(name)))
  }

  pub fn var_symbol(&mut self, name: InternedString) -> Term {
    self.intern(TermKind::Var(name))
  }

  pub fn constant(&mut self, literal: Literal) -> Term {
    self.intern(TermKind::Const(literal))
  }

  pub fn integer(&mut self, value: i64) -> Term {
    self.intern(TermKind::Const(Literal::Integer(value)))
  }

  pub fn string(&mut self, value: &str) -> Term {
    self.intern(TermKind::Const(Literal::String(interned(value))))
  }

  pub fn fun<I>(&mut self, symbol: &str, args: I) -> Term
    where I: IntoIterator<Item = Term>
  {
    self.intern(TermKind::Fun(interned(symbol), args.into_iter().collect()))
  }

  pub fn fun_symbol(&mut self, symbol: InternedString, args: Children) -> Term {
    self.intern(TermKind::Fun(symbol, args))
  }

  pub fn app(&mut self, function: Term, argument: Term) -> Term {
    self.intern(TermKind::App(function, argument))
  }

  pub fn lambda(&mut self, body: Term) -> Term {
    self.intern(TermKind::Lambda(body))
  }

  /// A bound variable with de Bruijn `index`, relative to the binders of store `scope`.
  pub fn lambda_var(&mut self, index: u32, scope: ScopeId) -> Term {
    self.intern(TermKind::LambdaVar { index, scope })
  }

  // endregion

  /// Creates the node of the same variant as `template` with the given children, which must belong to this store.
  /// A childless template is re-interned as is, so a `LambdaVar` keeps the scope it is relative to.
  pub fn rebuild(&mut self, template: &Term, children: Children) -> Term {
    if children.is_empty() && self.contains(template) {
      return template.clone();
    }

    let kind =
      match template.kind() {
        TermKind::Fun(symbol, _) => TermKind::Fun(*symbol, children),

        TermKind::App(..) => {
          let mut children = children.into_iter();
          match (children.next(), children.next()) {
            (Some(function), Some(argument)) => TermKind::App(function, argument),
            _ => panic!("an application has exactly two children"),
          }
        }

        TermKind::Lambda(_) => {
          match children.into_iter().next() {
            Some(body) => TermKind::Lambda(body),
            None       => panic!("a lambda has exactly one child"),
          }
        }

        leaf => leaf.clone(),
      };

    self.intern(kind)
  }

  /// Interns an uncanonicalized tree, sharing every subtree that is already present. Bound variables of the tree
  /// are relative to this store's binders.
  pub fn insert_raw(&mut self, raw: &RawTerm) -> Term {
    let term =
      match raw {
        RawTerm::Var(name)   => self.var_symbol(*name),
        RawTerm::Const(lit)  => self.constant(lit.clone()),
        RawTerm::Bound(i)    => self.lambda_var(*i, self.scope),
        RawTerm::Lambda(b)   => {
          let body = self.insert_raw(b);
          self.lambda(body)
        }
        RawTerm::App(l, r)   => {
          let function = self.insert_raw(l);
          let argument = self.insert_raw(r);
          self.app(function, argument)
        }
        RawTerm::Fun(symbol, args) => {
          let args: Children = args.iter().map(|arg| self.insert_raw(arg)).collect();
          self.fun_symbol(*symbol, args)
        }
      };
    log(Channel::Debug, 5, format!("Interned {} at {}.", term, term.position()).as_str());
    term
  }
}
