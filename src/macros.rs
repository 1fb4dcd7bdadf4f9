// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Emit macros.
//!
//! Each macro takes a logger followed by either a format string with arguments, or a `;` and a
//! list of values that are joined by single spaces:
//!
//! ```
//! # let logger = rotalog::Logger::builder().output(std::io::sink()).build().unwrap();
//! rotalog::info!(logger, "listening on {}:{}", "0.0.0.0", 8080);
//! rotalog::info!(logger; "listening on", "0.0.0.0", 8080);
//! ```
//!
//! Arguments are not evaluated when the level is below the logger's threshold.

/// Emit a record at the given [`Level`](crate::Level).
#[macro_export]
macro_rules! emit {
    ($logger:expr, $level:expr; $($value:expr),+ $(,)?) => {{
        let logger: &$crate::Logger = &$logger;
        let level: $crate::Level = $level;
        if logger.enabled(level) {
            logger.log(
                level,
                $crate::__private::Joined(&[$(&$value as &dyn ::std::fmt::Display),+]),
            );
        }
    }};
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger: &$crate::Logger = &$logger;
        let level: $crate::Level = $level;
        if logger.enabled(level) {
            logger.log(level, ::std::format_args!($($arg)+));
        }
    }};
}

/// Emit a `Debug` record.
#[macro_export]
macro_rules! debug {
    ($logger:expr; $($value:expr),+ $(,)?) => {
        $crate::emit!($logger, $crate::Level::Debug; $($value),+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::emit!($logger, $crate::Level::Debug, $($arg)+)
    };
}

/// Emit an `Info` record.
#[macro_export]
macro_rules! info {
    ($logger:expr; $($value:expr),+ $(,)?) => {
        $crate::emit!($logger, $crate::Level::Info; $($value),+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::emit!($logger, $crate::Level::Info, $($arg)+)
    };
}

/// Emit a `Warn` record.
#[macro_export]
macro_rules! warn {
    ($logger:expr; $($value:expr),+ $(,)?) => {
        $crate::emit!($logger, $crate::Level::Warn; $($value),+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::emit!($logger, $crate::Level::Warn, $($arg)+)
    };
}

/// Emit an `Error` record.
#[macro_export]
macro_rules! error {
    ($logger:expr; $($value:expr),+ $(,)?) => {
        $crate::emit!($logger, $crate::Level::Error; $($value),+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::emit!($logger, $crate::Level::Error, $($arg)+)
    };
}

/// Emit a `Fatal` record and exit the process with status 1.
///
/// The process exits even when the threshold discards the record.
#[macro_export]
macro_rules! fatal {
    ($logger:expr; $($value:expr),+ $(,)?) => {{
        let logger: &$crate::Logger = &$logger;
        logger.fatal($crate::__private::Joined(&[$(&$value as &dyn ::std::fmt::Display),+]))
    }};
    ($logger:expr, $($arg:tt)+) => {{
        let logger: &$crate::Logger = &$logger;
        logger.fatal(::std::format_args!($($arg)+))
    }};
}

#[doc(hidden)]
pub mod __private {
    use std::fmt;

    /// Values displayed one after another, separated by a single space.
    pub struct Joined<'a>(pub &'a [&'a dyn fmt::Display]);

    impl fmt::Display for Joined<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            for (i, value) in self.0.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{value}")?;
            }
            Ok(())
        }
    }
}
