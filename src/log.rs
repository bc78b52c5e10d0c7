//! Logging shims forwarding to `tracing` if the `tracing` feature is
//! enabled and expanding to nothing otherwise.

#[cfg(feature = "tracing")]
#[allow(unused_imports)]
pub(crate) use tracing::{debug, error, info, trace, warn};


#[cfg(not(feature = "tracing"))]
mod noop {
    macro_rules! noop {
        ($($args:tt)*) => {{
            if false {
                // Keep arguments "used" so that disabling tracing does
                // not produce spurious warnings.
                let _args = ::std::format_args!($($args)*);
            }
        }};
    }

    // The macros carry a suffix because `warn` would otherwise be
    // ambiguous with the built-in attribute of the same name.
    macro_rules! debug_ {
        ($($args:tt)*) => { $crate::log::noop!($($args)*) };
    }

    macro_rules! error_ {
        ($($args:tt)*) => { $crate::log::noop!($($args)*) };
    }

    macro_rules! info_ {
        ($($args:tt)*) => { $crate::log::noop!($($args)*) };
    }

    macro_rules! trace_ {
        ($($args:tt)*) => { $crate::log::noop!($($args)*) };
    }

    macro_rules! warn_ {
        ($($args:tt)*) => { $crate::log::noop!($($args)*) };
    }

    #[allow(unused_imports)]
    pub(crate) use {
        debug_ as debug, error_ as error, info_ as info, noop, trace_ as trace, warn_ as warn,
    };
}

#[cfg(not(feature = "tracing"))]
#[allow(unused_imports)]
pub(crate) use noop::{debug, error, info, noop, trace, warn};


#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::log::debug;
    use crate::log::error;
    use crate::log::info;
    use crate::log::trace;
    use crate::log::warn;


    /// Check that all logging macros can be invoked with format
    /// arguments, irrespective of whether `tracing` is enabled.
    #[test]
    fn macro_invocation() {
        let name = "main";
        debug!("debug {name}");
        error!("error {}", name);
        info!("info {name:?}");
        trace!("trace");
        warn!("warn {name} {}", 42);
    }
}
