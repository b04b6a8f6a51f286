/*!

The normalizer reduces a term to a fixpoint under a rewriter, innermost first.

For the current term `t`:

  1. Follow `t`'s rewrite links to their end. If the end is a normal form, it is the result. If the chain passes a
     term that is being evaluated, or ends in a term that is not a normal form, the rewriting has come back to a term
     it has not finished with, and normalization fails with a `CycleError`.
  2. Normalize every child of `t`.
  3. If some child was rewritten, rebuild `t` from the normalized children, link `t` to the result, and continue
     with it.
  4. Otherwise rewrite `t` at the root. While the rewriter runs, `t` is marked as being evaluated, so that a
     condition that comes back to `t` is detected as a cycle rather than recursing forever. If no rule applies, `t`
     is a normal form. Otherwise link `t` to the reduct and continue with it.

Links, normal forms and the set of terms under evaluation are kept in the `Normalizer` and survive between calls to
`normalize`, so work done for one term is reused for every term that shares subterms with it.

*/

use fnv::{FnvHashMap, FnvHashSet};

use crate::{
  error::CycleError,
  insertion::{insert_into, LinkSource},
  logging::{Channel, log},
  rules::Rewriter,
  term::{Term, TermStore},
};


pub struct Normalizer<'a> {
  system      : &'a dyn Rewriter,
  /// Each term that has been rewritten or rebuilt, mapped to its successor.
  links       : FnvHashMap<Term, Term>,
  normal_forms: FnvHashSet<Term>,
  /// Terms whose root is being rewritten right now.
  evaluating  : FnvHashSet<Term>,
}

impl<'a> Normalizer<'a> {
  pub fn new(system: &'a dyn Rewriter) -> Normalizer<'a> {
    Normalizer {
      system,
      links       : FnvHashMap::default(),
      normal_forms: FnvHashSet::default(),
      evaluating  : FnvHashSet::default(),
    }
  }

  /// Reduces `term` to its normal form in `target`. A term from another store is inserted into `target` first.
  ///
  /// If a cycle is found, every link that does not lead to a normal form is discarded, so the normalizer can be used
  /// for other terms afterwards.
  pub fn normalize(&mut self, term: &Term, target: &mut TermStore) -> Result<Term, CycleError> {
    let term =
      if target.contains(term) {
        term.clone()
      } else {
        target.insert(term)?
      };

    log(Channel::Info, 4, format!("Normalizing {}", term).as_str());
    match self.reduce(&term, target) {
      Ok(normal_form) => {
        log(Channel::Info, 4, format!("{} normalizes to {}", term, normal_form).as_str());
        Ok(normal_form)
      }

      Err(error) => {
        log(Channel::Error, 1, format!("Normalizing {} failed. {}", term, error).as_str());
        self.discard_unfinished();
        Err(error)
      }
    }
  }

  pub fn is_normal_form(&self, term: &Term) -> bool {
    self.normal_forms.contains(term)
  }

  /// The normal form already computed for `term`, if any.
  pub fn normal_form_of(&self, term: &Term) -> Option<Term> {
    let end = self.chain_end(term);
    if self.normal_forms.contains(&end) {
      Some(end)
    } else {
      None
    }
  }

  /// Forgets everything learned so far.
  pub fn clear(&mut self) {
    self.links.clear();
    self.normal_forms.clear();
    self.evaluating.clear();
  }

  /// The fixpoint loop. Used recursively by conditional rules to normalize their conditions.
  pub(crate) fn reduce(&mut self, term: &Term, target: &mut TermStore) -> Result<Term, CycleError> {
    let mut current = self.resolve_links(term)?;

    loop {
      if self.normal_forms.contains(&current) {
        return Ok(current);
      }

      let mut child_rewritten = false;
      for child in current.children() {
        self.reduce(&child, target).map_err(|error| error.append(current.clone()))?;
        child_rewritten |= self.links.contains_key(&child);
      }

      let next =
        if child_rewritten {
          insert_into(&current, target, &*self)?
        } else {
          self.evaluating.insert(current.clone());
          let system = self.system;
          let result = system.rewrite(&current, target, self);
          self.evaluating.remove(&current);

          match result? {
            None => {
              log(Channel::Debug, 5, format!("{} is a normal form", current).as_str());
              self.normal_forms.insert(current.clone());
              return Ok(current);
            }

            Some(reduct) if reduct == current => {
              return Err(CycleError::new(current));
            }

            Some(reduct) => reduct,
          }
        };

      let next = self.resolve_links(&next).map_err(|error| error.append(current.clone()))?;
      self.links.insert(current.clone(), next.clone());
      current = next;
    } // end loop
  }

  /// Follows the links of `term` to their end and shortens the chain. A linked term must lead to a normal form.
  fn resolve_links(&mut self, term: &Term) -> Result<Term, CycleError> {
    if self.evaluating.contains(term) {
      return Err(CycleError::new(term.clone()));
    }

    let mut end = match self.links.get(term) {
      Some(next) => next.clone(),
      None       => return Ok(term.clone()),
    };
    while let Some(next) = self.links.get(&end) {
      if self.evaluating.contains(&end) {
        break;
      }
      end = next.clone();
    }

    if !self.normal_forms.contains(&end) {
      return Err(CycleError::new(end).append(term.clone()));
    }
    self.links.insert(term.clone(), end.clone());
    Ok(end)
  }

  fn chain_end(&self, term: &Term) -> Term {
    let mut end = term.clone();
    while let Some(next) = self.links.get(&end) {
      end = next.clone();
    }
    end
  }

  fn discard_unfinished(&mut self) {
    let unfinished: Vec<Term> = self.links
                                    .keys()
                                    .filter(|term| !self.normal_forms.contains(&self.chain_end(term)))
                                    .cloned()
                                    .collect();
    for term in unfinished {
      self.links.remove(&term);
    }
    self.evaluating.clear();
  }
}

impl<'a> LinkSource for Normalizer<'a> {
  fn link(&self, term: &Term) -> Option<Term> {
    self.links.get(term).cloned()
  }

  fn is_pending(&self, term: &Term) -> bool {
    self.evaluating.contains(term)
  }
}
