/*!

Uncanonicalized term trees, as produced by a front end. A `RawTerm` belongs to no store; it enters one through
`TermStore::insert_raw`, which is the only way outside data becomes a `Term`.

*/

use crate::interner::{interned, InternedString};

use super::Literal;


#[derive(Clone, PartialEq, Eq, Debug)]
pub enum RawTerm {
  Var(InternedString),
  Const(Literal),
  Fun(InternedString, Vec<RawTerm>),
  App(Box<RawTerm>, Box<RawTerm>),
  Lambda(Box<RawTerm>),
  /// A de Bruijn index, relative to the binders of the tree.
  Bound(u32),
}

impl RawTerm {
  pub fn var(name: &str) -> RawTerm {
    RawTerm::Var(interned(name))
  }

  pub fn int(value: i64) -> RawTerm {
    RawTerm::Const(Literal::Integer(value))
  }

  pub fn text(value: &str) -> RawTerm {
    RawTerm::Const(Literal::String(interned(value)))
  }

  pub fn fun(symbol: &str, args: Vec<RawTerm>) -> RawTerm {
    RawTerm::Fun(interned(symbol), args)
  }

  /// A nullary function symbol.
  pub fn atom(symbol: &str) -> RawTerm {
    RawTerm::Fun(interned(symbol), Vec::new())
  }

  pub fn app(function: RawTerm, argument: RawTerm) -> RawTerm {
    RawTerm::App(Box::new(function), Box::new(argument))
  }

  pub fn lambda(body: RawTerm) -> RawTerm {
    RawTerm::Lambda(Box::new(body))
  }

  pub fn bound(index: u32) -> RawTerm {
    RawTerm::Bound(index)
  }
}
