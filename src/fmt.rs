//! Logging macros for the radio independent core
//!
//! Forward to `defmt` when the `defmt` feature is enabled, otherwise the
//! arguments are only borrowed so host builds stay warning free.
#![allow(unused_macros)]

macro_rules! log_fwd {
    ($level:ident, $s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt")]
            ::defmt::$level!($s $(, $x)*);
            #[cfg(not(feature = "defmt"))]
            let _ = ($( & $x, )*);
        }
    };
}

macro_rules! debug {
    ($($t:tt)*) => { log_fwd!(debug, $($t)*) };
}

macro_rules! info {
    ($($t:tt)*) => { log_fwd!(info, $($t)*) };
}

macro_rules! warn {
    ($($t:tt)*) => { log_fwd!(warn, $($t)*) };
}

macro_rules! error {
    ($($t:tt)*) => { log_fwd!(error, $($t)*) };
}
