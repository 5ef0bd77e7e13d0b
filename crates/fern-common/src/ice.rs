//! Internal compiler errors.
//!
//! An internal compiler error (ICE) means a pass broke a tree invariant. It is
//! never a property of the input program, so it is never recovered from: the
//! message is logged and the compilation aborts.

use std::fmt;

/// Abort the compilation with an internal compiler error.
///
/// ```should_panic
/// fern_common::ice!("statement list of `{}` is corrupt", "main");
/// ```
#[macro_export]
macro_rules! ice {
    ($($arg:tt)*) => {
        $crate::ice_abort(::std::format_args!($($arg)*))
    };
}

#[cold]
#[track_caller]
pub fn ice_abort(args: fmt::Arguments<'_>) -> ! {
    tracing::error!(target: "fern::ice", "internal compiler error: {args}");
    panic!("internal compiler error: {args}");
}
