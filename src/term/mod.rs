/*!

Term nodes and the data model.

A `Term` is a cheap, reference-counted handle to a canonical node living in exactly one `TermStore`. Because every
node is hash-consed on creation, two terms from the same store are structurally equal if and only if they are the
same node, so `Term` compares and hashes by identity.

The variants are:

| Variant     | Payload                            | Arity |
|:------------|:-----------------------------------|:------|
| `Var`       | name                               | 0     |
| `Const`     | `Literal`                          | 0     |
| `Fun`       | symbol, ordered children           | n     |
| `App`       | function term, argument term       | 2     |
| `Lambda`    | body                               | 1     |
| `LambdaVar` | de Bruijn index, owning scope      | 0     |

Each node also records its `free_depth`, one more than the largest de Bruijn index that is free in it (so 0 means
closed). Shifting and substitution use it to skip subterms they cannot change.

*/

mod store;
pub(crate) mod raw;
mod display;

use std::{
  cmp::Ordering,
  fmt,
  hash::{Hash, Hasher},
  rc::Rc,
  sync::atomic::{AtomicU32, Ordering as AtomicOrdering},
};

use fnv::FnvHashSet;
use smallvec::{SmallVec, smallvec};
use strum_macros::{EnumDiscriminants, IntoStaticStr};

use crate::{
  format::{DisplayForm, Formattable},
  interner::{InternedString, resolve_str},
};

pub use store::TermStore;
pub use raw::RawTerm;

/// Children of a node. Most function symbols have small arity.
pub type Children = SmallVec<[Term; 4]>;

static NEXT_SCOPE: AtomicU32 = AtomicU32::new(0);

/// Identifies a `TermStore`. De Bruijn indices are relative to the scope that owns them.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ScopeId(u32);

impl ScopeId {
  pub(crate) fn fresh() -> ScopeId {
    ScopeId(NEXT_SCOPE.fetch_add(1, AtomicOrdering::Relaxed))
  }
}

impl fmt::Display for ScopeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}


/// Opaque constant payloads. They are compared by value and never evaluated.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Literal {
  Integer(i64),
  String(InternedString),
}

impl fmt::Display for Literal {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Literal::Integer(value) => write!(f, "{}", value),
      Literal::String(value)  => write!(f, "\"{}\"", resolve_str(*value)),
    }
  }
}

impl From<i64> for Literal {
  fn from(value: i64) -> Self {
    Literal::Integer(value)
  }
}


/// The content of a node. Children are compared by identity, so equality of two `TermKind`s is exactly the one-level
/// structural equality that hash-consing needs.
#[derive(Clone, PartialEq, Eq, Hash, Debug, IntoStaticStr, EnumDiscriminants)]
#[strum_discriminants(name(TermTag), derive(Hash, IntoStaticStr))]
pub enum TermKind {
  Var(InternedString),
  Const(Literal),
  Fun(InternedString, Children),
  App(Term, Term),
  Lambda(Term),
  LambdaVar {
    index: u32,
    scope: ScopeId,
  },
}

impl TermKind {
  /// The children of this node, in order.
  pub fn children(&self) -> Children {
    match self {
      TermKind::Fun(_, args)  => args.clone(),
      TermKind::App(l, r)     => smallvec![l.clone(), r.clone()],
      TermKind::Lambda(body)  => smallvec![body.clone()],

      | TermKind::Var(_)
      | TermKind::Const(_)
      | TermKind::LambdaVar { .. } => Children::new(),
    }
  }

  /// The position of the youngest child. A node equal to `self` can only have been created after all of its
  /// children, so canonical lookups never need to look at positions below this one.
  pub(crate) fn search_hint(&self) -> Option<usize> {
    match self {
      TermKind::Fun(_, args) => args.iter().map(Term::position).max(),
      TermKind::App(l, r)    => Some(l.position().max(r.position())),
      TermKind::Lambda(body) => Some(body.position()),
      _                      => None,
    }
  }

  fn free_depth(&self) -> u32 {
    match self {
      TermKind::Var(_) | TermKind::Const(_)  => 0,
      TermKind::LambdaVar { index, .. }      => index.saturating_add(1),
      TermKind::Fun(_, args)                 => args.iter().map(Term::free_depth).max().unwrap_or(0),
      TermKind::App(l, r)                    => l.free_depth().max(r.free_depth()),
      TermKind::Lambda(body)                 => body.free_depth().saturating_sub(1),
    }
  }
}


pub struct TermNode {
  kind      : TermKind,
  scope     : ScopeId,
  position  : usize,
  free_depth: u32,
}


/// A handle to a canonical node. Cloning is a reference count increment.
#[derive(Clone)]
pub struct Term(Rc<TermNode>);

impl Term {
  pub(crate) fn new(kind: TermKind, scope: ScopeId, position: usize) -> Term {
    let free_depth = kind.free_depth();
    Term(Rc::new(TermNode { kind, scope, position, free_depth }))
  }

  pub fn kind(&self) -> &TermKind {
    &self.0.kind
  }

  pub fn tag(&self) -> TermTag {
    (&self.0.kind).into()
  }

  /// The scope of the store owning this node.
  pub fn scope(&self) -> ScopeId {
    self.0.scope
  }

  /// The position of this node in its store. Children always have smaller positions than their parents.
  pub fn position(&self) -> usize {
    self.0.position
  }

  pub fn free_depth(&self) -> u32 {
    self.0.free_depth
  }

  /// True if no de Bruijn index is free in this term.
  pub fn is_closed(&self) -> bool {
    self.0.free_depth == 0
  }

  pub fn is_var(&self) -> bool {
    matches!(self.0.kind, TermKind::Var(_))
  }

  pub fn is_lambda(&self) -> bool {
    matches!(self.0.kind, TermKind::Lambda(_))
  }

  pub fn arity(&self) -> usize {
    match &self.0.kind {
      TermKind::Fun(_, args) => args.len(),
      TermKind::App(..)      => 2,
      TermKind::Lambda(_)    => 1,
      _                      => 0,
    }
  }

  pub fn arg(&self, i: usize) -> Option<&Term> {
    match (&self.0.kind, i) {
      (TermKind::Fun(_, args), i) => args.get(i),
      (TermKind::App(l, _), 0)    => Some(l),
      (TermKind::App(_, r), 1)    => Some(r),
      (TermKind::Lambda(body), 0) => Some(body),
      _                           => None,
    }
  }

  pub fn children(&self) -> Children {
    self.0.kind.children()
  }

  /// The function symbol of a `Fun` or the name of a `Var`.
  pub fn symbol(&self) -> Option<InternedString> {
    match &self.0.kind {
      TermKind::Fun(symbol, _) | TermKind::Var(symbol) => Some(*symbol),
      _                                                => None,
    }
  }

  pub fn literal(&self) -> Option<&Literal> {
    match &self.0.kind {
      TermKind::Const(literal) => Some(literal),
      _                        => None,
    }
  }

  /// Rebuilds `self` in `store` with child `i` replaced by `child`. Returns `None` if `i` is out of range.
  pub fn replace(&self, store: &mut TermStore, i: usize, child: Term) -> Option<Term> {
    if i >= self.arity() {
      return None;
    }
    let mut children = self.children();
    children[i] = child;
    Some(store.rebuild(self, children))
  }

  /// Every distinct subterm exactly once, children before parents. Shared subterms are visited once no matter how
  /// many times they are referenced.
  pub fn dag(&self) -> std::vec::IntoIter<Term> {
    let mut seen : FnvHashSet<Term> = FnvHashSet::default();
    let mut order: Vec<Term>        = Vec::new();
    let mut stack: Vec<(Term, bool)> = vec![(self.clone(), false)];

    while let Some((term, expanded)) = stack.pop() {
      if expanded {
        order.push(term);
        continue;
      }
      if !seen.insert(term.clone()) {
        continue;
      }
      let children = term.children();
      stack.push((term, true));
      for child in children.into_iter().rev() {
        if !seen.contains(&child) {
          stack.push((child, false));
        }
      }
    }

    order.into_iter()
  }
}

impl PartialEq for Term {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }
}

impl Eq for Term {}

impl Hash for Term {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.0.scope.hash(state);
    self.0.position.hash(state);
  }
}

impl PartialOrd for Term {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

/// Terms order by store, then by position within the store.
impl Ord for Term {
  fn cmp(&self, other: &Self) -> Ordering {
    (self.0.scope, self.0.position).cmp(&(other.0.scope, other.0.position))
  }
}

/// De Bruijn form, which keeps the scope of foreign bound variables visible.
impl fmt::Debug for Term {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.format(&DisplayForm::DeBruijn.into()))
  }
}
