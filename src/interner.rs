/*!
A global dictionary of interned strings. Function symbols, variable names, and string constants are all interned
here, so that comparing two of them during hash-consing is an integer comparison. Provides an abstraction API for any
interner library.

*/

use std::sync::Mutex;

use lazy_static::lazy_static;
use string_interner::{
  StringInterner,
  symbol::SymbolU32
};

pub type InternedString = SymbolU32;

lazy_static! {
  static ref STRING_INTERNER: Mutex<StringInterner> = Mutex::new(StringInterner::default());
}


pub fn interned(string: &str) -> InternedString {
  let mut interner = STRING_INTERNER.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
  interner.get_or_intern(string)
}


/// Resolves `symbol` to an owned string. Symbols are only ever produced by this module, so resolution cannot fail
/// for a symbol obtained from `interned`.
pub fn resolve_str(symbol: InternedString) -> String {
  let interner = STRING_INTERNER.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
  interner.resolve(symbol).map(str::to_string).unwrap_or_default()
}
