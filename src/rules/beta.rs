use std::fmt::{Display, Formatter};

use crate::{
  error::CycleError,
  insertion::beta,
  normalize::Normalizer,
  term::{Term, TermKind, TermStore},
};

use super::{RewriteRule, Rewriter};


/// Beta reduction as a rule: `(\.body) argument` rewrites to `body` with the bound variable replaced by `argument`.
#[derive(Copy, Clone, Debug, Default)]
pub struct Beta;

impl Beta {
  pub fn apply(&self, term: &Term, target: &mut TermStore) -> Result<Option<Term>, CycleError> {
    let term =
      if target.contains(term) {
        term.clone()
      } else {
        target.insert(term)?
      };

    match term.kind() {
      TermKind::App(function, argument) => {
        match function.kind() {
          TermKind::Lambda(body) => Ok(Some(beta(target, body, argument))),
          _                      => Ok(None),
        }
      }
      _ => Ok(None),
    }
  }
}

impl Rewriter for Beta {
  fn rewrite(&self, term: &Term, target: &mut TermStore, _normalizer: &mut Normalizer<'_>)
    -> Result<Option<Term>, CycleError>
  {
    self.apply(term, target)
  }
}

impl RewriteRule for Beta {}

impl Display for Beta {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "beta")
  }
}


#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;
  use crate::{
    rules::RewriteSystem,
    term::RawTerm,
  };
  use crate::term::raw::tests::arb_first_order_term;

  fn identity() -> RawTerm {
    RawTerm::lambda(RawTerm::bound(0))
  }

  fn normalize_with_beta(raw: &RawTerm) -> String {
    let mut system = RewriteSystem::default();
    system.push(Beta);
    let mut store = TermStore::new();
    let t = store.insert_raw(raw);
    let mut normalizer = Normalizer::new(&system);
    normalizer.normalize(&t, &mut store).unwrap().to_string()
  }

  #[test]
  fn identity_application() {
    let mut store = TermStore::new();
    let t = store.insert_raw(&RawTerm::app(identity(), RawTerm::var("y")));
    let y = store.var("y");
    assert_eq!(Beta.apply(&t, &mut store).unwrap(), Some(y));

    let not_a_redex = store.insert_raw(&RawTerm::app(RawTerm::var("f"), RawTerm::var("y")));
    assert_eq!(Beta.apply(&not_a_redex, &mut store).unwrap(), None);
  }

  #[test]
  fn arguments_are_normalized_first() {
    // (\x.f(x, x)) ((\y.y) z)
    let duplicate = RawTerm::lambda(RawTerm::fun("f", vec![RawTerm::bound(0), RawTerm::bound(0)]));
    let t = RawTerm::app(duplicate, RawTerm::app(identity(), RawTerm::var("z")));
    assert_eq!(normalize_with_beta(&t), "f(z, z)");
  }

  #[test]
  fn curried_application() {
    // (\x.\y.x) a b
    let k = RawTerm::lambda(RawTerm::lambda(RawTerm::bound(1)));
    let t = RawTerm::app(RawTerm::app(k, RawTerm::var("a")), RawTerm::var("b"));
    assert_eq!(normalize_with_beta(&t), "a");
  }

  #[test]
  fn self_application_is_a_cycle() {
    let omega = RawTerm::lambda(RawTerm::app(RawTerm::bound(0), RawTerm::bound(0)));
    let mut system = RewriteSystem::default();
    system.push(Beta);
    let mut store = TermStore::new();
    let t = store.insert_raw(&RawTerm::app(omega.clone(), omega));
    let mut normalizer = Normalizer::new(&system);
    assert!(normalizer.normalize(&t, &mut store).is_err());
  }

  #[test]
  fn foreign_redex_is_inserted_first() {
    let mut source = TermStore::new();
    let mut target = TermStore::new();
    let t = source.insert_raw(&RawTerm::app(identity(), RawTerm::int(4)));
    assert_eq!(Beta.apply(&t, &mut target).unwrap().map(|t| t.to_string()), Some("4".to_string()));
  }

  proptest! {
    #[test]
    fn identity_returns_its_argument(y in arb_first_order_term()) {
      let mut system = RewriteSystem::default();
      system.push(Beta);
      let mut store = TermStore::new();
      let t = store.insert_raw(&RawTerm::app(identity(), y.clone()));
      let y = store.insert_raw(&y);
      let mut normalizer = Normalizer::new(&system);
      prop_assert_eq!(normalizer.normalize(&t, &mut store).unwrap(), y);
    }
  }
}
