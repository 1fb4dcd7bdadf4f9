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

//! Severity levels and thresholds.

use std::cmp;
use std::fmt;
use std::str::FromStr;

/// The severity of a log record.
///
/// From least to most severe: `Debug < Info < Warn < Error < Fatal`.
#[repr(usize)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Level {
    /// Designates lower priority information.
    Debug = 0,
    /// Designates useful information.
    Info = 1,
    /// Designates hazardous situations.
    Warn = 2,
    /// Designates very serious errors.
    Error = 3,
    /// Designates unrecoverable errors. Emitting a fatal record terminates the process.
    Fatal = 4,
}

impl Level {
    /// All levels, least severe first.
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    /// Return the string representation of the `Level`.
    ///
    /// This returns the same string as the `fmt::Display` implementation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug | log::Level::Trace => Self::Debug,
        }
    }
}

/// A severity threshold.
///
/// A record is emitted iff its level is greater than or equal to the threshold. `Off` is above
/// every level and therefore suppresses all records.
#[repr(usize)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Default)]
pub enum LevelFilter {
    /// Admit every record.
    Debug = 0,
    /// Admit `Info` and above.
    #[default]
    Info = 1,
    /// Admit `Warn` and above.
    Warn = 2,
    /// Admit `Error` and above.
    Error = 3,
    /// Admit only `Fatal`.
    Fatal = 4,
    /// Admit nothing.
    Off = 5,
}

impl LevelFilter {
    /// Return the string representation of the `LevelFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelFilter::Debug => "DEBUG",
            LevelFilter::Info => "INFO",
            LevelFilter::Warn => "WARN",
            LevelFilter::Error => "ERROR",
            LevelFilter::Fatal => "FATAL",
            LevelFilter::Off => "OFF",
        }
    }

    pub(crate) fn from_usize(n: usize) -> LevelFilter {
        match n {
            0 => LevelFilter::Debug,
            1 => LevelFilter::Info,
            2 => LevelFilter::Warn,
            3 => LevelFilter::Error,
            4 => LevelFilter::Fatal,
            _ => LevelFilter::Off,
        }
    }
}

impl fmt::Display for LevelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<Level> for LevelFilter {
    fn from(level: Level) -> Self {
        LevelFilter::from_usize(level as usize)
    }
}

impl PartialEq<LevelFilter> for Level {
    fn eq(&self, other: &LevelFilter) -> bool {
        PartialEq::eq(&(*self as usize), &(*other as usize))
    }
}

impl PartialOrd<LevelFilter> for Level {
    fn partial_cmp(&self, other: &LevelFilter) -> Option<cmp::Ordering> {
        Some(Ord::cmp(&(*self as usize), &(*other as usize)))
    }
}

impl PartialEq<Level> for LevelFilter {
    fn eq(&self, other: &Level) -> bool {
        other.eq(self)
    }
}

impl PartialOrd<Level> for LevelFilter {
    fn partial_cmp(&self, other: &Level) -> Option<cmp::Ordering> {
        Some(Ord::cmp(&(*self as usize), &(*other as usize)))
    }
}

/// Whether a record of `level` passes `threshold`.
///
/// Side-effect free, so callers run it before taking any lock.
#[inline]
pub fn should_emit(level: Level, threshold: LevelFilter) -> bool {
    level >= threshold
}

/// The type returned by `from_str` when the string doesn't match any of the log levels.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct ParseLevelError {}

impl fmt::Display for ParseLevelError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str("malformed log level")
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;
    fn from_str(s: &str) -> Result<Level, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| s.eq_ignore_ascii_case(level.as_str()))
            .ok_or(ParseLevelError {})
    }
}

impl FromStr for LevelFilter {
    type Err = ParseLevelError;
    fn from_str(s: &str) -> Result<LevelFilter, Self::Err> {
        if s.eq_ignore_ascii_case("off") {
            return Ok(LevelFilter::Off);
        }
        Level::from_str(s).map(LevelFilter::from)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for LevelFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|_| serde::de::Error::custom(format!("unknown log level: {s}")))
    }
}
