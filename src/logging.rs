/*!

Verbosity-gated diagnostic messages. Every message is sent on a `Channel` and carries a level; it is only emitted if
the global verbosity is at least that level.

Level conventions:

  * 1: errors and detected cycles
  * 4: normalization progress
  * 5: matching and insertion detail

*/

pub use verbosity::*;


// Global control over verbose messaging.
pub(crate) mod verbosity {
  use std::{
    io::{Stdout, stdout, Write},
    sync::Mutex
  };

  use lazy_static::lazy_static;
  use strum_macros::{Display, IntoStaticStr};
  use yansi::Paint;

  lazy_static! {
    static ref VERBOSITY     : Mutex<i32>    = Mutex::new(0);
    static ref VERBOSE_STREAM: Mutex<Stdout> = Mutex::new(stdout());
  }

  #[derive(Copy, Clone, PartialEq, Eq, Debug, Display, IntoStaticStr, Hash)]
  pub enum Channel {
    Error,
    Warning,
    Notice,
    Info,
    Debug,
  }

  impl Channel {
    fn label(&self) -> String {
      let name: &'static str = self.into();
      match self {
        Channel::Error   => Paint::red(name).bold().to_string(),
        Channel::Warning => Paint::yellow(name).bold().to_string(),
        Channel::Notice  => Paint::cyan(name).to_string(),
        Channel::Info    => Paint::green(name).to_string(),
        Channel::Debug   => Paint::blue(name).to_string(),
      }
    }
  }

  fn verbosity_is_at_least(level: i32) -> bool {
    get_verbosity() >= level
  }

  pub fn set_verbosity(new_value: i32) {
    let mut verbosity = VERBOSITY.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    *verbosity = new_value;
  }

  pub fn get_verbosity() -> i32 {
    *VERBOSITY.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  pub(crate) fn verbose_emit(msg: &str) {
    let mut stream = VERBOSE_STREAM.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _ = stream.write(msg.as_bytes());
    let _ = stream.write("\n".as_bytes());
  }

  /// Only emits a message if the verbosity level is at least `level`.
  pub fn log(channel: Channel, level: i32, msg: &str) {
    if verbosity_is_at_least(level) {
      verbose_emit(format!("{}: {}", channel.label(), msg).as_str());
    }
  }
}
