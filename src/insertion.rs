/*!

Insertion copies a term into a target store while resolving pending substitutions. Substitutions are not stored in
the terms themselves. They are supplied by a `LinkSource`, which maps a term to the term that replaces it: the
bindings of a `Matcher` or `Unifier`, the rewrite links of a `Normalizer`, or any combination of these.

Insertion runs in two passes over the shared DAG, both memoized per node so that a subterm referenced many times is
processed once:

 1. Preparation computes for every node whether any link is set below it and how deep its free de Bruijn indices
    reach once substituted. A node whose link chain leads back to itself is a substitution cycle and aborts the
    insertion with a `CycleError`.
 2. Copying works bottom up. A linked node is replaced by the copy of its link target. A node that is link free,
    closed and already in the target store is reused as is. Anything else is rebuilt from its copied children.

A `Lambda` whose binder belongs to another store has its bound variable renamed into the target store on the way in.
This is the only place where de Bruijn indices of different stores are reconciled.

All traversal state lives in the `Insertion` value of a single call, so the stores are untouched by a failed
insertion apart from the nodes it has already created.

*/

use fnv::{FnvHashMap, FnvHashSet};

use crate::{
  error::CycleError,
  logging::{Channel, log},
  term::{ScopeId, Term, TermKind, TermStore},
};


/// A read-only view of pending substitutions.
pub trait LinkSource {
  /// The term `term` is to be replaced by, if any.
  fn link(&self, term: &Term) -> Option<Term>;

  /// True if `term` is in the middle of being rewritten. Reaching such a term while resolving links is a cycle.
  fn is_pending(&self, _term: &Term) -> bool {
    false
  }
}

/// The empty substitution.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoLinks;

impl LinkSource for NoLinks {
  fn link(&self, _term: &Term) -> Option<Term> {
    None
  }
}

impl LinkSource for FnvHashMap<Term, Term> {
  fn link(&self, term: &Term) -> Option<Term> {
    self.get(term).cloned()
  }
}

/// Links of the first source take precedence.
impl<A, B> LinkSource for (&A, &B)
  where A: LinkSource + ?Sized,
        B: LinkSource + ?Sized
{
  fn link(&self, term: &Term) -> Option<Term> {
    self.0.link(term).or_else(|| self.1.link(term))
  }

  fn is_pending(&self, term: &Term) -> bool {
    self.0.is_pending(term) || self.1.is_pending(term)
  }
}


#[derive(Copy, Clone, Debug)]
struct Prepared {
  link_free : bool,
  free_depth: u32,
}

struct Insertion<'l, L: LinkSource + ?Sized> {
  links      : &'l L,
  prepared   : FnvHashMap<Term, Prepared>,
  in_progress: FnvHashSet<Term>,
  inserted   : FnvHashMap<Term, Term>,
}

impl<'l, L: LinkSource + ?Sized> Insertion<'l, L> {
  fn new(links: &'l L) -> Self {
    Insertion {
      links,
      prepared   : FnvHashMap::default(),
      in_progress: FnvHashSet::default(),
      inserted   : FnvHashMap::default(),
    }
  }

  fn prepare(&mut self, term: &Term) -> Result<Prepared, CycleError> {
    if let Some(prepared) = self.prepared.get(term) {
      return Ok(*prepared);
    }
    if self.in_progress.contains(term) || self.links.is_pending(term) {
      return Err(CycleError::new(term.clone()));
    }

    self.in_progress.insert(term.clone());
    let result = self.prepare_node(term);
    self.in_progress.remove(term);

    let prepared = result.map_err(|error| error.append(term.clone()))?;
    self.prepared.insert(term.clone(), prepared);
    Ok(prepared)
  }

  fn prepare_node(&mut self, term: &Term) -> Result<Prepared, CycleError> {
    if let Some(next) = self.links.link(term) {
      let end = self.prepare(&next)?;
      return Ok(Prepared { link_free: false, free_depth: end.free_depth });
    }

    let prepared =
      match term.kind() {
        TermKind::Var(_) | TermKind::Const(_) => Prepared { link_free: true, free_depth: 0 },

        TermKind::LambdaVar { .. } => Prepared { link_free: true, free_depth: term.free_depth() },

        TermKind::Lambda(body) => {
          let body = self.prepare(body)?;
          Prepared { link_free: body.link_free, free_depth: body.free_depth.saturating_sub(1) }
        }

        TermKind::Fun(..) | TermKind::App(..) => {
          let mut prepared = Prepared { link_free: true, free_depth: 0 };
          for child in term.children().iter() {
            let child = self.prepare(child)?;
            prepared.link_free  &= child.link_free;
            prepared.free_depth  = prepared.free_depth.max(child.free_depth);
          }
          prepared
        }
      };

    Ok(prepared)
  }

  fn copy(&mut self, term: &Term, target: &mut TermStore) -> Term {
    if let Some(copy) = self.inserted.get(term) {
      return copy.clone();
    }

    let reusable = self.prepared
                       .get(term)
                       .map_or(false, |prepared| prepared.link_free && prepared.free_depth == 0);

    let copy =
      if let Some(next) = self.links.link(term) {
        self.copy(&next, target)
      } else if reusable && target.contains(term) {
        term.clone()
      } else {
        match term.kind() {
          TermKind::Lambda(body) if !target.contains(term) => {
            let body  = self.copy(body, target);
            let scope = target.scope();
            // Make room for the new binder, then rename the old binder's variable to it.
            let body  = shift(target, &body, scope, 1, 0);
            let fresh = target.lambda_var(0, scope);
            let body  = substitute(target, &body, term.scope(), 0, &fresh);
            target.lambda(body)
          }

          _ => {
            let children = term.children().iter().map(|child| self.copy(child, target)).collect();
            target.rebuild(term, children)
          }
        }
      };

    self.inserted.insert(term.clone(), copy.clone());
    copy
  }
}


/// Copies `term` into `target`, replacing every linked subterm by the end of its link chain.
pub fn insert_into<L>(term: &Term, target: &mut TermStore, links: &L) -> Result<Term, CycleError>
  where L: LinkSource + ?Sized
{
  let mut insertion = Insertion::new(links);

  if let Err(error) = insertion.prepare(term) {
    log(Channel::Debug, 5, format!("Insertion of {} failed. {}", term, error).as_str());
    return Err(error);
  }

  let result = insertion.copy(term, target);
  log(Channel::Debug, 5, format!("Inserted {} as {}.", term, result).as_str());
  Ok(result)
}

impl TermStore {
  /// Copies `term` from any store into this one.
  pub fn insert(&mut self, term: &Term) -> Result<Term, CycleError> {
    insert_into(term, self, &NoLinks)
  }
}


// region de Bruijn index manipulation

/// Adds `delta` to every index of `scope` at or above `cutoff`, where the cutoff grows by one under each binder.
/// `term` must belong to `store`.
pub fn shift(store: &mut TermStore, term: &Term, scope: ScopeId, delta: i32, cutoff: u32) -> Term {
  if delta == 0 {
    return term.clone();
  }
  let mut memo = FnvHashMap::default();
  shift_memoized(store, term, scope, delta, cutoff, &mut memo)
}

fn shift_memoized(
  store : &mut TermStore,
  term  : &Term,
  scope : ScopeId,
  delta : i32,
  cutoff: u32,
  memo  : &mut FnvHashMap<(Term, u32), Term>
) -> Term
{
  if term.free_depth() <= cutoff {
    return term.clone();
  }
  let key = (term.clone(), cutoff);
  if let Some(shifted) = memo.get(&key) {
    return shifted.clone();
  }

  let shifted =
    match term.kind() {
      TermKind::Lambda(body) => {
        let body = shift_memoized(store, body, scope, delta, cutoff + 1, memo);
        store.lambda(body)
      }

      TermKind::LambdaVar { index, scope: var_scope } if *var_scope == scope && *index >= cutoff => {
        store.lambda_var(index.saturating_add_signed(delta), *var_scope)
      }

      _ => {
        let children = term.children()
                           .iter()
                           .map(|child| shift_memoized(store, child, scope, delta, cutoff, memo))
                           .collect();
        store.rebuild(term, children)
      }
    };

  memo.insert(key, shifted.clone());
  shifted
}


struct Substitution {
  scope       : ScopeId,
  // The replacement as seen from under `n` more binders than the top, keyed by target index.
  replacements: FnvHashMap<u32, Term>,
  memo        : FnvHashMap<(Term, u32), Term>,
}

impl Substitution {
  fn replacement(&mut self, store: &mut TermStore, index: u32) -> Term {
    if let Some(replacement) = self.replacements.get(&index) {
      return replacement.clone();
    }
    // The starting index is always present, so `index > 0` here.
    let outer   = self.replacement(store, index - 1);
    let scope   = store.scope();
    let shifted = shift(store, &outer, scope, 1, 0);
    self.replacements.insert(index, shifted.clone());
    shifted
  }

  fn apply(&mut self, store: &mut TermStore, term: &Term, index: u32) -> Term {
    if term.free_depth() <= index {
      return term.clone();
    }
    let key = (term.clone(), index);
    if let Some(result) = self.memo.get(&key) {
      return result.clone();
    }

    let result =
      match term.kind() {
        TermKind::Lambda(body) => {
          let body = self.apply(store, body, index + 1);
          store.lambda(body)
        }

        TermKind::LambdaVar { index: var_index, scope } if *scope == self.scope && *var_index == index => {
          self.replacement(store, index)
        }

        _ => {
          let children = term.children().iter().map(|child| self.apply(store, child, index)).collect();
          store.rebuild(term, children)
        }
      };

    self.memo.insert(key, result.clone());
    result
  }
}

/// Replaces the variable with `index` of `scope` by `replacement`, shifting the replacement by one for every binder
/// it is pushed under. Both `term` and `replacement` must belong to `store`.
pub fn substitute(store: &mut TermStore, term: &Term, scope: ScopeId, index: u32, replacement: &Term) -> Term {
  let mut substitution = Substitution {
    scope,
    replacements: FnvHashMap::default(),
    memo        : FnvHashMap::default(),
  };
  substitution.replacements.insert(index, replacement.clone());
  substitution.apply(store, term, index)
}

/// Reduces `(\.body) argument`, where `body` is the body of a lambda of `store`.
pub fn beta(store: &mut TermStore, body: &Term, argument: &Term) -> Term {
  let scope       = store.scope();
  let lifted      = shift(store, argument, scope, 1, 0);
  let substituted = substitute(store, body, scope, 0, &lifted);
  shift(store, &substituted, scope, -1, 0)
}

// endregion
