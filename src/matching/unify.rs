/*!

Syntactic unification, the symmetric counterpart of matching. Either side may be a variable. Links are followed
before anything else, so a variable bound earlier in the same attempt stands for its binding.

No occurs check is performed. Unifying `x` with `f(x)` succeeds and leaves the cyclic link `x → f(x)` in place;
instantiating such bindings with `insert_into` reports the cycle.

*/

use fnv::FnvHashMap;

use crate::{
  insertion::LinkSource,
  logging::{Channel, log},
  term::{Term, TermKind},
};

use super::{MatchEquation, SolutionSet, variable_solutions};


#[derive(Default)]
pub struct Unifier {
  trail: Vec<Term>,
  links: FnvHashMap<Term, Term>,
}

impl Unifier {
  pub fn new() -> Unifier {
    Unifier::default()
  }

  /// Attempts to unify `left` and `right`, extending the current bindings. On failure the bindings are exactly what
  /// they were before the call.
  pub fn unify(&mut self, left: &Term, right: &Term) -> bool {
    let checkpoint = self.trail.len();
    let unified    = self.unify_terms(left, right);

    if !unified {
      self.ununify_to(checkpoint);
    }
    log(
      Channel::Debug,
      5,
      format!(
        "unify {} {}",
        MatchEquation { pattern: left.clone(), ground: right.clone() },
        if unified { "succeeded" } else { "failed" }
      ).as_str()
    );
    unified
  }

  /// Clears every binding.
  pub fn ununify(&mut self) {
    self.trail.clear();
    self.links.clear();
  }

  pub fn binding(&self, term: &Term) -> Option<&Term> {
    self.links.get(term)
  }

  /// Follows the links from `term` to the end of its chain. Does not terminate on cyclic bindings.
  pub fn resolve(&self, term: &Term) -> Term {
    let mut end = term.clone();
    while let Some(next) = self.links.get(&end) {
      end = next.clone();
    }
    end
  }

  pub fn is_empty(&self) -> bool {
    self.trail.is_empty()
  }

  /// The bound variables with the terms they are directly linked to.
  pub fn solutions(&self) -> SolutionSet {
    variable_solutions(self.links.iter())
  }

  fn unify_terms(&mut self, this: &Term, that: &Term) -> bool {
    if this == that {
      return true;
    }
    if let Some(next) = self.links.get(this).cloned() {
      return self.unify_terms(&next, that);
    }
    if let Some(next) = self.links.get(that).cloned() {
      return self.unify_terms(this, &next);
    }

    if this.is_var() || !that.is_var() {
      if self.unify_structure(this, that) {
        self.bind(this, that);
        true
      } else {
        false
      }
    } else {
      self.bind(that, this);
      true
    }
  }

  /// One level of structural comparison, assuming `that` is a variable only if `this` is.
  fn unify_structure(&mut self, this: &Term, that: &Term) -> bool {
    match (this.kind(), that.kind()) {
      (TermKind::Var(_), _) => true,

      (TermKind::Const(a), TermKind::Const(b)) => a == b,

      (TermKind::Fun(f, these), TermKind::Fun(g, those)) => {
        f == g
          && these.len() == those.len()
          && self.unify_children(these.iter().zip(those.iter()))
      }

      (TermKind::App(tl, tr), TermKind::App(ul, ur)) => {
        self.unify_children([(tl, ul), (tr, ur)].into_iter())
      }

      _ => false,
    }
  }

  fn unify_children<'t, I>(&mut self, pairs: I) -> bool
    where I: Iterator<Item = (&'t Term, &'t Term)>
  {
    let checkpoint = self.trail.len();
    for (this, that) in pairs {
      if !self.unify_terms(this, that) {
        self.ununify_to(checkpoint);
        return false;
      }
    }
    true
  }

  fn bind(&mut self, from: &Term, to: &Term) {
    self.links.insert(from.clone(), to.clone());
    self.trail.push(from.clone());
  }

  fn ununify_to(&mut self, checkpoint: usize) {
    while self.trail.len() > checkpoint {
      if let Some(key) = self.trail.pop() {
        self.links.remove(&key);
      }
    }
  }
}

impl LinkSource for Unifier {
  fn link(&self, term: &Term) -> Option<Term> {
    self.links.get(term).cloned()
  }
}


#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;
  use crate::{
    insertion::insert_into,
    interner::resolve_str,
    term::{RawTerm, TermStore},
  };
  use crate::term::raw::tests::arb_first_order_term;

  #[test]
  fn variables_on_either_side() {
    let mut left  = TermStore::new();
    let mut right = TermStore::new();
    let l = left.insert_raw(&RawTerm::fun("f", vec![RawTerm::var("x"), RawTerm::int(2)]));
    let r = right.insert_raw(&RawTerm::fun("f", vec![RawTerm::int(1), RawTerm::var("y")]));

    let mut unifier = Unifier::new();
    assert!(unifier.unify(&l, &r));

    let mut target = TermStore::new();
    assert_eq!(insert_into(&l, &mut target, &unifier).unwrap().to_string(), "f(1, 2)");
    assert_eq!(insert_into(&r, &mut target, &unifier).unwrap().to_string(), "f(1, 2)");
  }

  #[test]
  fn bindings_are_consistent() {
    let mut store = TermStore::new();
    let l = store.insert_raw(&RawTerm::fun("f", vec![RawTerm::var("x"), RawTerm::var("x")]));
    let r = store.insert_raw(&RawTerm::fun("f", vec![RawTerm::int(1), RawTerm::int(2)]));
    let mut unifier = Unifier::new();
    assert!(!unifier.unify(&l, &r));
    assert!(unifier.is_empty());

    let r = store.insert_raw(&RawTerm::fun("f", vec![RawTerm::var("y"), RawTerm::int(2)]));
    assert!(unifier.unify(&l, &r));
    let x = store.var("x");
    assert_eq!(unifier.resolve(&x).to_string(), "2");
  }

  #[test]
  fn shared_variables_unify_in_either_order() {
    let mut store = TermStore::new();
    let gy = RawTerm::fun("g", vec![RawTerm::var("y")]);
    let l  = store.insert_raw(&RawTerm::fun("f", vec![RawTerm::var("x"), RawTerm::var("x")]));
    let r  = store.insert_raw(&RawTerm::fun("f", vec![gy, RawTerm::fun("g", vec![RawTerm::atom("a")])]));
    let y  = store.var("y");

    let mut forward = Unifier::new();
    assert!(forward.unify(&l, &r));
    assert_eq!(forward.resolve(&y).to_string(), "a()");

    let mut backward = Unifier::new();
    assert!(backward.unify(&r, &l));
    assert_eq!(backward.resolve(&y).to_string(), "a()");
  }

  #[test]
  fn no_occurs_check() {
    let mut store = TermStore::new();
    let x  = store.var("x");
    let fx = store.fun("f", [x.clone()]);

    let mut unifier = Unifier::new();
    assert!(unifier.unify(&x, &fx));
    assert_eq!(unifier.binding(&x), Some(&fx));

    let mut target = TermStore::new();
    assert!(insert_into(&x, &mut target, &unifier).is_err());

    unifier.ununify();
    assert_eq!(insert_into(&x, &mut target, &unifier).unwrap().to_string(), "x");
  }

  #[test]
  fn lambdas_are_opaque() {
    let mut left  = TermStore::new();
    let mut right = TermStore::new();
    let identity = RawTerm::lambda(RawTerm::bound(0));
    let l = left.insert_raw(&identity);
    let r = right.insert_raw(&identity);
    assert!(!Unifier::new().unify(&l, &r));
    assert!(Unifier::new().unify(&l, &l));
  }

  /// Renames variables so that every occurrence is a distinct variable.
  fn linearize(raw: &RawTerm, prefix: &str, counter: &mut usize) -> RawTerm {
    match raw {
      RawTerm::Var(_) => {
        *counter += 1;
        RawTerm::var(&format!("{}{}", prefix, counter))
      }
      RawTerm::Fun(symbol, args) => {
        RawTerm::Fun(*symbol, args.iter().map(|arg| linearize(arg, prefix, counter)).collect())
      }
      RawTerm::App(l, r) => {
        let l = linearize(l, prefix, counter);
        let r = linearize(r, prefix, counter);
        RawTerm::app(l, r)
      }
      other => other.clone(),
    }
  }

  proptest! {
    #[test]
    fn unification_is_symmetric(s in arb_first_order_term(), t in arb_first_order_term()) {
      let s = linearize(&s, "s", &mut 0);
      let t = linearize(&t, "t", &mut 0);
      let mut left  = TermStore::new();
      let mut right = TermStore::new();
      let s = left.insert_raw(&s);
      let t = right.insert_raw(&t);

      let forward  = Unifier::new().unify(&s, &t);
      let backward = Unifier::new().unify(&t, &s);
      prop_assert_eq!(forward, backward);
    }

    #[test]
    fn unification_is_symmetric_within_one_store(s in arb_first_order_term(), t in arb_first_order_term()) {
      // Repeated variables, and variables shared between both sides, make binding order matter.
      let mut store = TermStore::new();
      let s = store.insert_raw(&s);
      let t = store.insert_raw(&t);

      let forward  = Unifier::new().unify(&s, &t);
      let backward = Unifier::new().unify(&t, &s);
      prop_assert_eq!(forward, backward);
    }

    #[test]
    fn unifier_instantiates_both_sides_equally(s in arb_first_order_term(), t in arb_first_order_term()) {
      let s = linearize(&s, "s", &mut 0);
      let t = linearize(&t, "t", &mut 0);
      let mut left  = TermStore::new();
      let mut right = TermStore::new();
      let s = left.insert_raw(&s);
      let t = right.insert_raw(&t);

      let mut unifier = Unifier::new();
      if unifier.unify(&s, &t) {
        let mut target = TermStore::new();
        let s = insert_into(&s, &mut target, &unifier).unwrap();
        let t = insert_into(&t, &mut target, &unifier).unwrap();
        prop_assert_eq!(s, t);
        prop_assert!(unifier.solutions().iter().all(|(var, _)| var.symbol().map(resolve_str).is_some()));
      }
    }
  }
}
