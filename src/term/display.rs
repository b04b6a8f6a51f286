/*!

Rendering of terms and stores.

  * `Fun` renders as `f(a, b)`, or `f()` with no children.
  * `App` renders as `l r`, with `l` parenthesized if it is a lambda and `r` parenthesized if it is an application
    or a lambda.
  * `Lambda` renders as `\a.body`, naming binders `a`, `b`, … by nesting depth. In `DeBruijn` form the binder
    shows its nesting level instead.
  * A `LambdaVar` renders as the name of its binder, or as `%i` if it is not bound within the rendered term. In
    `DeBruijn` form a variable relative to a store other than its own renders as `%i:scope`, which is also what
    `Debug` shows.

*/

use crate::{
  format::{DisplayForm, Formattable, Formatter},
  interner::resolve_str,
};

use super::{Term, TermKind, TermStore};


fn binder_name(depth: usize) -> String {
  let letter = (b'a' + (depth % 26) as u8) as char;
  match depth / 26 {
    0     => letter.to_string(),
    round => format!("{}{}", letter, round),
  }
}

fn format_term(term: &Term, formatter: &Formatter, binders: &mut Vec<String>) -> String {
  match term.kind() {

    TermKind::Var(name) => {
      match formatter.form {
        DisplayForm::Matcher => format!("‹{}›", resolve_str(*name)),
        _                    => resolve_str(*name),
      }
    }

    TermKind::Const(literal) => literal.to_string(),

    TermKind::Fun(symbol, args) => {
      let args = args.iter()
                     .map(|arg| format_term(arg, formatter, binders))
                     .collect::<Vec<_>>()
                     .join(", ");
      format!("{}({})", resolve_str(*symbol), args)
    }

    TermKind::App(function, argument) => {
      let mut left  = format_term(function, formatter, binders);
      let mut right = format_term(argument, formatter, binders);

      if function.is_lambda() {
        left = format!("({})", left);
      }
      if matches!(argument.kind(), TermKind::App(..) | TermKind::Lambda(_)) {
        right = format!("({})", right);
      }
      format!("{} {}", left, right)
    }

    TermKind::Lambda(body) => {
      let depth = binders.len();
      let name  =
        match formatter.form {
          DisplayForm::DeBruijn => depth.to_string(),
          _                     => binder_name(depth),
        };
      binders.push(name.clone());
      let body = format_term(body, formatter, binders);
      binders.pop();
      format!("\\{}.{}", name, body)
    }

    TermKind::LambdaVar { index, scope } => {
      let index   = *index as usize;
      let foreign = *scope != term.scope();
      match formatter.form {
        DisplayForm::DeBruijn if foreign       => format!("%{}:{}", index, scope),
        DisplayForm::DeBruijn                  => format!("%{}", index),
        _ if !foreign && index < binders.len() => binders[binders.len() - 1 - index].clone(),
        _                                      => format!("%{}", index),
      }
    }

  } // end match on kind
}

impl Formattable for Term {
  fn format(&self, formatter: &Formatter) -> String {
    format_term(self, formatter, &mut Vec::new())
  }
}

display_formattable_impl!(Term);


impl Formattable for TermStore {
  fn format(&self, formatter: &Formatter) -> String {
    self.nodes()
        .iter()
        .map(|term| term.format(formatter))
        .collect::<Vec<_>>()
        .join(" :: ")
  }
}

display_formattable_impl!(TermStore);
