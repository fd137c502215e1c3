//! Logging abstraction
//!
//! Provides unified logging macros that work across different targets:
//! - Embedded (`embedded` feature): Uses defmt
//! - Host tests: Uses println!
//! - Host non-test: No-op
//!
//! Arguments must be plain values (`&str`, integers, floats) so the same
//! call compiles against both defmt and `core::fmt`.

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::info!($($arg)*);

        #[cfg(all(not(feature = "embedded"), test))]
        println!("[INFO] {}", format_args!($($arg)*));

        #[cfg(all(not(feature = "embedded"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::warn!($($arg)*);

        #[cfg(all(not(feature = "embedded"), test))]
        println!("[WARN] {}", format_args!($($arg)*));

        #[cfg(all(not(feature = "embedded"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::error!($($arg)*);

        #[cfg(all(not(feature = "embedded"), test))]
        eprintln!("[ERROR] {}", format_args!($($arg)*));

        #[cfg(all(not(feature = "embedded"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::debug!($($arg)*);

        #[cfg(all(not(feature = "embedded"), test))]
        println!("[DEBUG] {}", format_args!($($arg)*));

        #[cfg(all(not(feature = "embedded"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log trace message
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::trace!($($arg)*);

        #[cfg(all(not(feature = "embedded"), test))]
        println!("[TRACE] {}", format_args!($($arg)*));

        #[cfg(all(not(feature = "embedded"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_accept_format_arguments() {
        let id: u16 = 4;
        let late_us: u64 = 1_200;
        crate::log_info!("task {} started", id);
        crate::log_warn!("task {} late by {} us", id, late_us);
        crate::log_error!("sensor fault on {}", "barometer");
        crate::log_debug!("distance {}", 11.18f32);
        crate::log_trace!("tick");
    }
}
