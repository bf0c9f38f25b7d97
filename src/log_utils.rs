pub use log::debug;

/// Print a debug message if either the global debug log level or a local debug flag is enabled
///
/// The local debug flag is given as the first argument. When it is set the message is printed
/// directly to stderr, otherwise it is sent to the logger at debug level.
///
/// # Examples
///
/// ```ignore
/// let debug = false;
/// debug_msg!(debug, "Clique size: {}", clique.len());
/// ```
macro_rules! debug_msg {
    ($flag:expr, $($arg:tt)+) => {
        if $flag {
            eprintln!($($arg)+);
        } else {
            $crate::log_utils::debug!($($arg)+);
        }
    }
}

pub(crate) use debug_msg;
