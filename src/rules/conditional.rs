/*!

Conditional rules `pattern -> template <= s1 -> t1, …, sn -> tn`.

After the head matches, each condition is checked in order: `si` is instantiated with the bindings made so far and
normalized, and `ti` must match the normal form, which may bind further variables for the conditions that follow and
for the template. The first condition that fails makes the rule inapplicable.

Each application gets its own `Matcher`. The recursive normalization of a condition may apply this very rule again
without disturbing the bindings of the outer application.

*/

use std::fmt::{Display, Formatter};

use crate::{
  error::CycleError,
  insertion::insert_into,
  logging::{Channel, log},
  matching::Matcher,
  normalize::Normalizer,
  term::{RawTerm, Term, TermStore},
};

use super::{RewriteRule, Rewriter, Rule};


/// A side condition `lhs -> rhs`: the normal form of `lhs` must match `rhs`.
#[derive(Clone)]
pub struct Condition {
  pub lhs: Term,
  pub rhs: Term,
}

impl Display for Condition {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} -> {}", self.lhs, self.rhs)
  }
}


pub struct ConditionalRule {
  rule      : Rule,
  conditions: Vec<Condition>,
}

impl ConditionalRule {
  /// The sides of `rule` and of every condition must share the rule's store.
  pub fn new(rule: Rule, conditions: Vec<Condition>) -> ConditionalRule {
    assert!(
      conditions.iter().all(|c| rule.store().contains(&c.lhs) && rule.store().contains(&c.rhs)),
      "conditions must belong to the rule's store"
    );
    ConditionalRule { rule, conditions }
  }

  pub fn from_raw(pattern: &RawTerm, template: &RawTerm, conditions: &[(RawTerm, RawTerm)]) -> ConditionalRule {
    let mut store   = TermStore::new();
    let pattern     = store.insert_raw(pattern);
    let template    = store.insert_raw(template);
    let conditions  = conditions.iter()
                                .map(|(lhs, rhs)| Condition { lhs: store.insert_raw(lhs), rhs: store.insert_raw(rhs) })
                                .collect();
    ConditionalRule {
      rule: Rule::new(store, pattern, template),
      conditions,
    }
  }

  pub fn rule(&self) -> &Rule {
    &self.rule
  }

  pub fn conditions(&self) -> &[Condition] {
    &self.conditions
  }
}

impl Rewriter for ConditionalRule {
  fn rewrite(&self, term: &Term, target: &mut TermStore, normalizer: &mut Normalizer<'_>)
    -> Result<Option<Term>, CycleError>
  {
    let mut matcher = Matcher::new();
    if !matcher.match_term(self.rule.pattern(), term) {
      return Ok(None);
    }

    for condition in self.conditions.iter() {
      let instance    = insert_into(&condition.lhs, target, &(&matcher, &*normalizer))?;
      let normal_form = normalizer.reduce(&instance, target)?;

      if !matcher.match_term(&condition.rhs, &normal_form) {
        log(
          Channel::Debug,
          4,
          format!("Condition {} failed for {}: {} is normal.", condition, term, normal_form).as_str()
        );
        return Ok(None);
      }
    }

    let reduct = insert_into(self.rule.template(), target, &(&matcher, &*normalizer));
    matcher.unmatch();
    reduct.map(Some)
  }
}

impl RewriteRule for ConditionalRule {
  fn pattern(&self) -> Option<&Term> {
    Some(self.rule.pattern())
  }
}

impl Display for ConditionalRule {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.rule)?;
    if !self.conditions.is_empty() {
      let conditions = self.conditions.iter().map(Condition::to_string).collect::<Vec<_>>().join(", ");
      write!(f, " <= {}", conditions)?;
    }
    Ok(())
  }
}
