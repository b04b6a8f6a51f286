/*!

Syntactic matching and unification over canonical terms.

Both algorithms record their bindings in a map from terms to terms instead of in the terms themselves, together with a
trail of the keys in the order they were bound. Undoing a failed branch pops the trail back to a checkpoint, so no
partial binding survives a failed attempt.

Not only variables are bound. Every non-variable node that matched is linked to its counterpart as well, which lets
insertion reuse a matched subterm wholesale when a template shares it with the pattern.

Matching and unification are defined on terms without unresolved binders: a `Lambda` or `LambdaVar` only matches
itself. Unification performs no occurs check; binding `x` to `f(x)` succeeds, and the resulting cycle surfaces as a
`CycleError` when the bindings are instantiated.

*/

mod matcher;
mod unify;

use std::fmt::Display;

use crate::{
  format::{DisplayForm, Formattable},
  interner::resolve_str,
  term::Term,
};

pub use matcher::Matcher;
pub use unify::Unifier;


/// Bound pattern variables paired with the terms they are bound to, in variable name order.
pub type SolutionSet = Vec<(Term, Term)>;

/// Pulls the variable bindings out of a binding map, in variable name order.
fn variable_solutions<'a, I>(bindings: I) -> SolutionSet
  where I: Iterator<Item = (&'a Term, &'a Term)>
{
  let mut solutions: SolutionSet = bindings.filter(|(variable, _)| variable.is_var())
                                           .map(|(variable, value)| (variable.clone(), value.clone()))
                                           .collect();
  solutions.sort_by_cached_key(|(variable, _)| {
    (variable.symbol().map(resolve_str).unwrap_or_default(), variable.clone())
  });
  solutions
}

pub fn display_solutions(solutions: &SolutionSet) -> String {
  solutions.iter()
           .map(|(variable, value)| {
             format!(
               "{} = {}",
               variable.format(&DisplayForm::Matcher.into()),
               value.format(&DisplayForm::Input.into())
             )
           })
           .collect::<Vec<String>>()
           .join(", ")
}


/// A pair of terms to be matched or unified, used for diagnostics.
#[derive(Clone)]
pub struct MatchEquation {
  pub(crate) pattern: Term,
  pub(crate) ground : Term,
}

impl Display for MatchEquation {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{} ≪ {}",
      self.pattern.format(&DisplayForm::Matcher.into()),
      self.ground.format(&DisplayForm::Matcher.into())
    )
  }
}
