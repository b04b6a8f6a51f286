/*!

A `Matcher` holds the state of one-directional matching: the substitutions that are currently active and the
`match_stack` recording the order in which they were made. Only the pattern side binds.

Matching `pattern ≪ subject` proceeds as follows.

  1. If `pattern` and `subject` are the same node, succeed.
  2. If `pattern` is already bound, succeed only if it is bound to `subject`. This is what makes a repeated pattern
     variable require the same instance at every occurrence.
  3. A `Var` binds to anything.
  4. A `Const` matches an equal constant.
  5. A `Fun` or `App` matches a node of the same symbol and arity whose children match pairwise. On the first child
     that fails, every binding made for the earlier children is undone.
  6. A `Lambda` or `LambdaVar` matches nothing but itself.

*/

use std::fmt::Display;

use fnv::FnvHashMap;

use crate::{
  insertion::LinkSource,
  logging::{Channel, log},
  term::{Term, TermKind},
};

use super::{MatchEquation, SolutionSet, variable_solutions};


#[derive(Default)]
pub struct Matcher {
  /// Keys of `substitutions` in the order they were bound.
  match_stack  : Vec<Term>,
  substitutions: FnvHashMap<Term, Term>,
}

impl Display for Matcher {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let substitutions = self.match_stack
                            .iter()
                            .filter_map(|key| self.substitutions.get(key).map(|value| (key, value)))
                            .map(|(k, v)| format!("{}→{}", k, v))
                            .collect::<Vec<String>>()
                            .join(", ");
    write!(f, "S={{{}}}", substitutions)
  }
}

impl Matcher {
  pub fn new() -> Matcher {
    Matcher::default()
  }

  /// Attempts to match `pattern` against `subject`, extending the current bindings. On failure the bindings are
  /// exactly what they were before the call.
  pub fn match_term(&mut self, pattern: &Term, subject: &Term) -> bool {
    let checkpoint = self.match_stack.len();
    let matched    = self.match_terms(pattern, subject);

    if !matched {
      self.undo_to(checkpoint);
    }
    log(
      Channel::Debug,
      5,
      format!(
        "{} {}",
        MatchEquation { pattern: pattern.clone(), ground: subject.clone() },
        if matched { "matched" } else { "failed" }
      ).as_str()
    );
    matched
  }

  /// Clears every binding, making the patterns reusable.
  pub fn unmatch(&mut self) {
    self.match_stack.clear();
    self.substitutions.clear();
  }

  /// The term `pattern` is currently bound to.
  pub fn binding(&self, pattern: &Term) -> Option<&Term> {
    self.substitutions.get(pattern)
  }

  pub fn is_empty(&self) -> bool {
    self.match_stack.is_empty()
  }

  /// The bound pattern variables with their instances.
  pub fn solutions(&self) -> SolutionSet {
    variable_solutions(self.substitutions.iter())
  }

  fn match_terms(&mut self, pattern: &Term, subject: &Term) -> bool {
    if pattern == subject {
      return true;
    }
    if let Some(bound) = self.substitutions.get(pattern) {
      return bound == subject;
    }

    let matched =
      match (pattern.kind(), subject.kind()) {
        (TermKind::Var(_), _) => true,

        (TermKind::Const(p), TermKind::Const(s)) => p == s,

        (TermKind::Fun(f, pattern_args), TermKind::Fun(g, subject_args)) => {
          f == g
            && pattern_args.len() == subject_args.len()
            && self.match_children(pattern_args.iter().zip(subject_args.iter()))
        }

        (TermKind::App(pl, pr), TermKind::App(sl, sr)) => {
          self.match_children([(pl, sl), (pr, sr)].into_iter())
        }

        _ => false,
      }; // end match on (pattern, subject)

    if matched {
      self.bind(pattern, subject);
    }
    matched
  }

  fn match_children<'t, I>(&mut self, pairs: I) -> bool
    where I: Iterator<Item = (&'t Term, &'t Term)>
  {
    let checkpoint = self.match_stack.len();
    for (pattern, subject) in pairs {
      if !self.match_terms(pattern, subject) {
        self.undo_to(checkpoint);
        return false;
      }
    }
    true
  }

  fn bind(&mut self, pattern: &Term, subject: &Term) {
    self.substitutions.insert(pattern.clone(), subject.clone());
    self.match_stack.push(pattern.clone());
  }

  fn undo_to(&mut self, checkpoint: usize) {
    while self.match_stack.len() > checkpoint {
      if let Some(key) = self.match_stack.pop() {
        self.substitutions.remove(&key);
      }
    }
  }
}

impl LinkSource for Matcher {
  fn link(&self, term: &Term) -> Option<Term> {
    self.substitutions.get(term).cloned()
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::term::{RawTerm, TermStore};

  fn both(pattern: &RawTerm, subject: &RawTerm) -> (TermStore, Term, TermStore, Term) {
    let mut pattern_store = TermStore::new();
    let mut subject_store = TermStore::new();
    let p = pattern_store.insert_raw(pattern);
    let s = subject_store.insert_raw(subject);
    (pattern_store, p, subject_store, s)
  }

  fn f(args: Vec<RawTerm>) -> RawTerm {
    RawTerm::fun("f", args)
  }

  #[test]
  fn variables_bind() {
    let (mut pattern_store, p, _, s) = both(
      &f(vec![RawTerm::var("x"), RawTerm::int(2)]),
      &f(vec![RawTerm::atom("a"), RawTerm::int(2)]),
    );
    let x = pattern_store.var("x");

    let mut matcher = Matcher::new();
    assert!(matcher.match_term(&p, &s));
    assert_eq!(matcher.binding(&x).map(Term::to_string), Some("a()".to_string()));
    // The matched pattern root is linked as well.
    assert_eq!(matcher.binding(&p), Some(&s));
  }

  #[test]
  fn non_linear_patterns() {
    let pattern = f(vec![RawTerm::var("x"), RawTerm::var("x")]);

    let (_, p, _, s) = both(&pattern, &f(vec![RawTerm::atom("a"), RawTerm::atom("a")]));
    assert!(Matcher::new().match_term(&p, &s));

    let (_, p, _, s) = both(&pattern, &f(vec![RawTerm::atom("a"), RawTerm::atom("b")]));
    let mut matcher = Matcher::new();
    assert!(!matcher.match_term(&p, &s));
    assert!(matcher.is_empty());
  }

  #[test]
  fn clashes() {
    let (_, p, _, s) = both(&f(vec![RawTerm::int(1)]), &f(vec![RawTerm::int(2)]));
    assert!(!Matcher::new().match_term(&p, &s));

    let (_, p, _, s) = both(&f(vec![RawTerm::var("x")]), &RawTerm::fun("g", vec![RawTerm::int(2)]));
    assert!(!Matcher::new().match_term(&p, &s));

    let (_, p, _, s) = both(&f(vec![RawTerm::var("x")]), &f(vec![RawTerm::int(1), RawTerm::int(2)]));
    assert!(!Matcher::new().match_term(&p, &s));

    let (_, p, _, s) = both(
      &RawTerm::app(RawTerm::var("x"), RawTerm::int(1)),
      &RawTerm::app(RawTerm::atom("h"), RawTerm::int(1)),
    );
    assert!(Matcher::new().match_term(&p, &s));
  }

  #[test]
  fn lambdas_match_only_themselves() {
    let identity = RawTerm::lambda(RawTerm::bound(0));
    let (_, p, _, s) = both(&identity, &identity);
    assert!(!Matcher::new().match_term(&p, &s));

    let mut store = TermStore::new();
    let t = store.insert_raw(&identity);
    assert!(Matcher::new().match_term(&t, &t));
  }

  #[test]
  fn failed_sibling_is_undone() {
    // x binds in the first argument, the second argument clashes.
    let (mut pattern_store, p, _, s) = both(
      &f(vec![RawTerm::var("x"), RawTerm::int(1)]),
      &f(vec![RawTerm::atom("a"), RawTerm::int(2)]),
    );
    let x = pattern_store.var("x");
    let mut matcher = Matcher::new();
    assert!(!matcher.match_term(&p, &s));
    assert_eq!(matcher.binding(&x), None);
  }

  #[test]
  fn unmatch_makes_pattern_reusable() {
    let pattern = f(vec![RawTerm::var("x")]);
    let mut pattern_store = TermStore::new();
    let mut subject_store = TermStore::new();
    let p  = pattern_store.insert_raw(&pattern);
    let s1 = subject_store.insert_raw(&f(vec![RawTerm::int(1)]));
    let s2 = subject_store.insert_raw(&f(vec![RawTerm::int(2)]));

    let mut matcher = Matcher::new();
    assert!(matcher.match_term(&p, &s1));
    assert!(!matcher.match_term(&p, &s2));
    matcher.unmatch();
    assert!(matcher.match_term(&p, &s2));
    assert_eq!(crate::matching::display_solutions(&matcher.solutions()), "‹x› = 2");
  }
}
