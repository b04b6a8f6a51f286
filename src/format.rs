/*!

  A `Formatter` holds information about how to format a term, that is, how to express the term as a string.

  "Formatting" needs to be distinct from Rust's standard `Display` trait, because terms are formatted differently
  depending on the context. Lambda binders can be shown with generated names or with their raw de Bruijn levels, and
  pattern variables are shown differently when we are displaying the state of the matcher.

*/

use strum::EnumString;


#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumString, Hash)]
pub enum DisplayForm {
  /// Binders get names `a`, `b`, … by nesting depth; bound variables use those names.
  #[strum(serialize = "InputForm")]
  Input,
  /// Binders show their nesting level (`\0.`, `\1.`, …); bound variables show their index (`%0`, `%1`, …).
  #[strum(serialize = "DeBruijnForm")]
  DeBruijn,
  /// Like `Input`, but pattern variables are written `‹x›`.
  #[strum(serialize = "MatcherForm")]
  Matcher,
}

impl Default for DisplayForm {
  fn default() -> DisplayForm {
    DisplayForm::Input
  }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash, Default)]
/// Parameters used in methods that transform terms into strings.
pub struct Formatter {
  pub form: DisplayForm,
}

impl From<DisplayForm> for Formatter {
  fn from(form: DisplayForm) -> Self {
    Formatter {
      form
    }
  }
}

pub trait Formattable {
  fn format(&self, formatter: &Formatter) -> String;
}


macro_rules! display_formattable_impl {
  ($type_name:ty) => {
    impl std::fmt::Display for $type_name {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format(&$crate::format::Formatter::default()))
      }
    }
  }
}


#[cfg(test)]
mod tests {
  use std::str::FromStr;
  use super::*;

  #[test]
  fn display_form_from_str() {
    assert_eq!(DisplayForm::from_str("DeBruijnForm"), Ok(DisplayForm::DeBruijn));
    assert_eq!(DisplayForm::from_str("MatcherForm"), Ok(DisplayForm::Matcher));
    assert!(DisplayForm::from_str("TeXForm").is_err());
  }

  #[test]
  fn default_formatter_uses_input_form() {
    assert_eq!(Formatter::default().form, DisplayForm::Input);
    let formatter: Formatter = DisplayForm::DeBruijn.into();
    assert_eq!(formatter.form, DisplayForm::DeBruijn);
  }
}
