/*!

Rewrite rules and rewrite systems.

A `Rewriter` performs one rewrite step at the root of a term, putting the reduct into a target store. Rewriters get
the active `Normalizer` so that conditional rules can normalize their side conditions and so that instantiating a
template sees the rewrites already performed.

A `RewriteSystem` is an ordered list of rules. The first rule that produces a reduct wins; there is no backtracking
across rules.

*/

mod beta;
mod conditional;
mod rule;

use std::fmt::{Display, Formatter};

use fnv::FnvHashMap;

use crate::{
  error::CycleError,
  logging::{Channel, log},
  normalize::Normalizer,
  term::{Children, Term, TermStore},
};

pub use beta::Beta;
pub use conditional::{Condition, ConditionalRule};
pub use rule::Rule;


pub trait Rewriter {
  /// One rewrite step at the root of `term`, which must belong to `target`. Returns `None` if `term` is irreducible
  /// at the root.
  fn rewrite(&self, term: &Term, target: &mut TermStore, normalizer: &mut Normalizer<'_>)
    -> Result<Option<Term>, CycleError>;

  /// Rewrites at the root for as long as possible. Returns `None` if not even the first step applies.
  fn transitive(&self, term: &Term, target: &mut TermStore, normalizer: &mut Normalizer<'_>)
    -> Result<Option<Term>, CycleError>
  {
    let mut current =
      match self.rewrite(term, target, normalizer)? {
        Some(reduct) => reduct,
        None         => return Ok(None),
      };

    while let Some(reduct) = self.rewrite(&current, target, normalizer)? {
      if reduct == current {
        return Err(CycleError::new(current));
      }
      current = reduct;
    }

    Ok(Some(current))
  }

  /// One parallel outermost step: every outermost redex of `term` is rewritten once. Shared subterms are rewritten
  /// once. Returns `None` if no subterm is reducible.
  fn rewrite_subterms(&self, term: &Term, target: &mut TermStore, normalizer: &mut Normalizer<'_>)
    -> Result<Option<Term>, CycleError>
  {
    let term =
      if target.contains(term) {
        term.clone()
      } else {
        target.insert(term)?
      };
    let mut cache = FnvHashMap::default();
    rewrite_outermost(self, &term, target, normalizer, &mut cache)
  }
}

fn rewrite_outermost<R>(
  rewriter  : &R,
  term      : &Term,
  target    : &mut TermStore,
  normalizer: &mut Normalizer<'_>,
  cache     : &mut FnvHashMap<Term, Option<Term>>
) -> Result<Option<Term>, CycleError>
  where R: Rewriter + ?Sized
{
  if let Some(result) = cache.get(term) {
    return Ok(result.clone());
  }

  let result =
    match rewriter.rewrite(term, target, normalizer)? {
      Some(reduct) => Some(reduct),

      None => {
        let mut changed  = false;
        let mut children = Children::new();
        for child in term.children() {
          match rewrite_outermost(rewriter, &child, target, normalizer, cache)? {
            Some(reduct) => {
              changed = true;
              children.push(reduct);
            }
            None => children.push(child),
          }
        }

        if changed {
          Some(target.rebuild(term, children))
        } else {
          None
        }
      }
    };

  cache.insert(term.clone(), result.clone());
  Ok(result)
}


/// A rule that can be part of a `RewriteSystem`.
pub trait RewriteRule: Rewriter + Display {
  /// The left-hand side the rule matches against, if it is pattern based.
  fn pattern(&self) -> Option<&Term> {
    None
  }
}


#[derive(Default)]
pub struct RewriteSystem {
  rules: Vec<Box<dyn RewriteRule>>,
}

impl RewriteSystem {
  pub fn new(rules: Vec<Box<dyn RewriteRule>>) -> RewriteSystem {
    RewriteSystem { rules }
  }

  pub fn push<R: RewriteRule + 'static>(&mut self, rule: R) {
    self.rules.push(Box::new(rule));
  }

  pub fn len(&self) -> usize {
    self.rules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }

  pub fn rules(&self) -> impl Iterator<Item = &dyn RewriteRule> {
    self.rules.iter().map(|rule| rule.as_ref())
  }

  /// One root step with a fresh normalizer, for callers outside of normalization.
  pub fn apply(&self, term: &Term, target: &mut TermStore) -> Result<Option<Term>, CycleError> {
    let term =
      if target.contains(term) {
        term.clone()
      } else {
        target.insert(term)?
      };
    let mut normalizer = Normalizer::new(self);
    self.rewrite(&term, target, &mut normalizer)
  }
}

impl Rewriter for RewriteSystem {
  /// Tries the rules in order and returns the first reduct. A rule that raises a cycle error counts as not
  /// applicable, unless every rule raises one, in which case the last error is propagated.
  fn rewrite(&self, term: &Term, target: &mut TermStore, normalizer: &mut Normalizer<'_>)
    -> Result<Option<Term>, CycleError>
  {
    let mut last_error: Option<CycleError> = None;
    let mut all_failed                      = !self.rules.is_empty();

    for rule in self.rules.iter() {
      match rule.rewrite(term, target, normalizer) {
        Ok(Some(reduct)) => {
          log(Channel::Info, 4, format!("{} -> {} by {}", term, reduct, rule).as_str());
          return Ok(Some(reduct));
        }

        Ok(None) => {
          all_failed = false;
        }

        Err(error) => {
          log(Channel::Debug, 4, format!("{} raised {} on {}", rule, error, term).as_str());
          last_error = Some(error);
        }
      }
    }

    match last_error {
      Some(error) if all_failed => Err(error),
      _                         => Ok(None),
    }
  }
}

impl Display for RewriteSystem {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    for rule in self.rules.iter() {
      writeln!(f, "{}", rule)?;
    }
    Ok(())
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::term::RawTerm;

  fn atom(name: &str) -> RawTerm {
    RawTerm::atom(name)
  }

  fn peano(n: usize) -> RawTerm {
    (0..n).fold(atom("0"), |t, _| RawTerm::fun("s", vec![t]))
  }

  #[test]
  fn first_matching_rule_wins() {
    let mut system = RewriteSystem::default();
    system.push(Rule::from_raw(&RawTerm::fun("f", vec![RawTerm::var("x")]), &atom("first")));
    system.push(Rule::from_raw(&RawTerm::fun("f", vec![atom("a")]), &atom("second")));

    let mut store = TermStore::new();
    let t = store.insert_raw(&RawTerm::fun("f", vec![atom("a")]));
    assert_eq!(system.apply(&t, &mut store).unwrap().map(|t| t.to_string()), Some("first()".to_string()));

    let g = store.insert_raw(&RawTerm::fun("g", vec![atom("a")]));
    assert_eq!(system.apply(&g, &mut store).unwrap(), None);
  }

  #[test]
  fn an_error_is_propagated_only_if_every_rule_raised_one() {
    // g(x) -> x <= g(x) -> 0 reaches the term under evaluation while instantiating its condition.
    let looping = ConditionalRule::from_raw(
      &RawTerm::fun("g", vec![RawTerm::var("x")]),
      &RawTerm::var("x"),
      &[(RawTerm::fun("g", vec![RawTerm::var("x")]), RawTerm::int(0))],
    );

    let mut store = TermStore::new();
    let t = store.insert_raw(&RawTerm::fun("g", vec![atom("a")]));

    let mut system = RewriteSystem::default();
    system.push(looping);
    {
      let mut normalizer = Normalizer::new(&system);
      assert!(normalizer.normalize(&t, &mut store).is_err());
    }

    system.push(Rule::from_raw(&RawTerm::fun("h", vec![RawTerm::var("x")]), &RawTerm::var("x")));
    let mut normalizer = Normalizer::new(&system);
    assert_eq!(normalizer.normalize(&t, &mut store).unwrap(), t);
  }

  #[test]
  fn transitive_rewrites_at_the_root() {
    let mut system = RewriteSystem::default();
    system.push(Rule::from_raw(&RawTerm::fun("s", vec![RawTerm::var("x")]), &RawTerm::var("x")));

    let mut store = TermStore::new();
    let three = store.insert_raw(&peano(3));
    let mut normalizer = Normalizer::new(&system);
    let result = system.transitive(&three, &mut store, &mut normalizer).unwrap();
    assert_eq!(result.map(|t| t.to_string()), Some("0()".to_string()));

    let zero = store.insert_raw(&peano(0));
    assert_eq!(system.transitive(&zero, &mut store, &mut normalizer).unwrap(), None);
  }

  #[test]
  fn subterm_step_is_parallel_and_outermost() {
    let mut system = RewriteSystem::default();
    system.push(Rule::from_raw(&RawTerm::fun("s", vec![RawTerm::var("x")]), &RawTerm::var("x")));

    let mut store = TermStore::new();
    let t = store.insert_raw(&RawTerm::fun("pair", vec![peano(2), peano(1)]));
    let mut normalizer = Normalizer::new(&system);
    let step = system.rewrite_subterms(&t, &mut store, &mut normalizer).unwrap();
    assert_eq!(step.map(|t| t.to_string()), Some("pair(s(0()), 0())".to_string()));

    let irreducible = store.insert_raw(&atom("0"));
    assert_eq!(system.rewrite_subterms(&irreducible, &mut store, &mut normalizer).unwrap(), None);
  }

  #[test]
  fn system_renders_one_rule_per_line() {
    let mut system = RewriteSystem::default();
    system.push(Rule::from_raw(&RawTerm::fun("f", vec![RawTerm::var("x")]), &RawTerm::var("x")));
    system.push(Beta);
    assert_eq!(system.len(), 2);
    assert_eq!(system.to_string(), "f(x) -> x\nbeta\n");
  }
}
