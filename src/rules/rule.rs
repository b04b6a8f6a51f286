use std::fmt::{Display, Formatter};

use crate::{
  error::CycleError,
  insertion::insert_into,
  matching::Matcher,
  normalize::Normalizer,
  term::{RawTerm, Term, TermStore},
};

use super::{RewriteRule, Rewriter};


/// An unconditional rule `pattern -> template`. The rule owns the private store both sides live in, and is never
/// mutated by applying it.
pub struct Rule {
  store   : TermStore,
  pattern : Term,
  template: Term,
}

impl Rule {
  /// Both `pattern` and `template` must belong to `store`.
  pub fn new(store: TermStore, pattern: Term, template: Term) -> Rule {
    assert!(
      store.contains(&pattern) && store.contains(&template),
      "both sides of a rule must belong to the rule's store"
    );
    Rule { store, pattern, template }
  }

  pub fn from_raw(pattern: &RawTerm, template: &RawTerm) -> Rule {
    let mut store = TermStore::new();
    let pattern   = store.insert_raw(pattern);
    let template  = store.insert_raw(template);
    Rule { store, pattern, template }
  }

  pub fn pattern(&self) -> &Term {
    &self.pattern
  }

  pub fn template(&self) -> &Term {
    &self.template
  }

  pub fn store(&self) -> &TermStore {
    &self.store
  }

  /// If `pattern` matches `term`, returns the template instantiated with the bindings, in `target`.
  pub fn apply(&self, term: &Term, target: &mut TermStore) -> Result<Option<Term>, CycleError> {
    let mut matcher = Matcher::new();
    if !matcher.match_term(&self.pattern, term) {
      return Ok(None);
    }
    let reduct = insert_into(&self.template, target, &matcher);
    matcher.unmatch();
    reduct.map(Some)
  }
}

impl Rewriter for Rule {
  fn rewrite(&self, term: &Term, target: &mut TermStore, normalizer: &mut Normalizer<'_>)
    -> Result<Option<Term>, CycleError>
  {
    let mut matcher = Matcher::new();
    if !matcher.match_term(&self.pattern, term) {
      return Ok(None);
    }
    let reduct = insert_into(&self.template, target, &(&matcher, &*normalizer));
    matcher.unmatch();
    reduct.map(Some)
  }
}

impl RewriteRule for Rule {
  fn pattern(&self) -> Option<&Term> {
    Some(&self.pattern)
  }
}

impl Display for Rule {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} -> {}", self.pattern, self.template)
  }
}
