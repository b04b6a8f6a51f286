/*!

A term rewriting engine over maximally shared term graphs.

Terms live in a `TermStore`, which hash-conses them: two structurally equal terms of the same store are the same
node, so equality is pointer equality and shared subterms are processed once. Terms include first-order function
applications, higher-order application, and lambda abstractions with de Bruijn indices.

On top of the stores sit one-directional matching and syntactic unification, rewrite rules with optional side
conditions, beta reduction, and a normalizer that reduces a term to a fixpoint and detects rewrite cycles.

*/

#[macro_use]
pub mod format;
pub mod interner;
pub mod logging;
mod error;
mod term;
mod insertion;
mod matching;
mod rules;
mod normalize;

pub use error::CycleError;
pub use format::{DisplayForm, Formattable, Formatter};
pub use insertion::{beta, insert_into, shift, substitute, LinkSource, NoLinks};
pub use logging::{get_verbosity, log, set_verbosity, Channel};
pub use matching::{display_solutions, MatchEquation, Matcher, SolutionSet, Unifier};
pub use normalize::Normalizer;
pub use rules::{Beta, Condition, ConditionalRule, RewriteRule, RewriteSystem, Rewriter, Rule};
pub use term::{Children, Literal, RawTerm, ScopeId, Term, TermKind, TermStore, TermTag};
