//! Opt-in verbosity levels for tracing lexer and parser decisions during development.
//!
//! None of this changes what the lexer or parser produce; a trace is purely a side
//! channel to `stdout`, gated behind `debug_assertions` so a release build never pays for
//! the formatting work even when a caller forgets to turn tracing back off.

use std::fmt::Debug;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Log<T> {
    None,
    Default(T),
    Success(T),
    Result(T),
    Verbose(T),
}

impl<T> Log<T> {
    /// Relative severity, low to high, used to decide whether a given trace call should
    /// print under the current level.
    pub fn order(&self) -> u8 {
        match self {
            Log::None => 0,
            Log::Default(_) => 1,
            Log::Success(_) => 2,
            Log::Result(_) => 3,
            Log::Verbose(_) => 4,
        }
    }

    pub fn label(&self) -> Option<&T> {
        match self {
            Log::None => None,
            Log::Default(t) | Log::Success(t) | Log::Result(t) | Log::Verbose(t) => Some(t),
        }
    }
}

/// Print a trace line if `level` is at least as verbose as `threshold`.
///
/// `label` is whatever was passed to `Log::Default("lexer")`-style opt-in, or `None` if
/// tracing is off; the line is skipped entirely in that case.
#[cfg_attr(not(debug_assertions), allow(unused_variables))]
pub fn trace<T: Debug>(level: Log<T>, threshold: Log<()>, message: impl FnOnce() -> String) {
    #[cfg(debug_assertions)]
    if level.order() >= threshold.order() {
        match level.label() {
            Some(label) => println!("[{:?}] {}", label, message()),
            None => println!("{}", message()),
        }
    }
}
