//! Macros for reporting bugs in the back end's own logic.
//!
//! These are for violations of invariants the back end is supposed to guarantee
//! for itself (an "impossible" match arm, a broken bookkeeping assumption) -
//! never for malformed input, which should flow back as a `CodegenError` instead.

/// Report an internal invariant violation and abort the current compile task.
///
/// Prints the file and line of the check that failed, then panics. The CLI's
/// compile entry point wraps the whole back end in `std::panic::catch_unwind`,
/// so this is the only place a back-end bug becomes a process-level panic.
#[macro_export]
macro_rules! internal_error {
    ($msg:expr) => {
        $crate::internal_error!("{}", $msg)
    };
    ($fmt:expr, $($args:tt)*) => {{
        eprintln!(
            "[{}:{}] internal compiler error: {}",
            file!(),
            line!(),
            format!($fmt, $($args)*),
        );
        panic!("internal compiler error, see above");
    }};
}

/// Like `internal_error!`, but for a match arm that the caller believes is
/// unreachable for any well-formed `Program`.
#[macro_export]
macro_rules! unreachable_internal {
    () => {
        $crate::internal_error!("reached a case believed unreachable")
    };
    ($fmt:expr $(, $args:tt)*) => {
        $crate::internal_error!($fmt $(, $args)*)
    };
}
