/*!

The single structured error of the crate. A `CycleError` is raised when a chain of substitutions or rewrites comes
back to a term it has already visited. It carries the terms along the chain, innermost first, growing as the error
unwinds through the traversal that found it.

*/

use thiserror::Error;

use crate::term::Term;


fn format_chain(chain: &[Term]) -> String {
  chain.iter().map(Term::to_string).collect::<Vec<_>>().join(", ")
}


#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Cycle: [{}]", format_chain(.chain))]
pub struct CycleError {
  pub chain: Vec<Term>,
}

impl CycleError {
  pub fn new(term: Term) -> CycleError {
    CycleError {
      chain: vec![term],
    }
  }

  /// Records `term` as the next outer link of the chain.
  pub fn append(mut self, term: Term) -> CycleError {
    self.chain.push(term);
    self
  }

  /// The term at which the cycle closed.
  pub fn origin(&self) -> Option<&Term> {
    self.chain.first()
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::term::TermStore;

  #[test]
  fn chain_renders_innermost_first() {
    let mut store = TermStore::new();
    let a  = store.var("a");
    let fa = store.fun("f", [a.clone()]);

    let error = CycleError::new(a.clone()).append(fa.clone());
    assert_eq!(error.origin(), Some(&a));
    assert_eq!(error.to_string(), "Cycle: [a, f(a)]");
  }
}
