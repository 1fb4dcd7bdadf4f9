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

//! Rotalog is a structured text logger with template formatting and size-based file rotation.
//!
//! # Overview
//!
//! A [`Logger`] filters records by severity, renders them through a `${tag}` [`Template`] and
//! writes them to standard output, an arbitrary writer, or a file. A file is rotated once it grows
//! past a size limit: the active file is swapped out synchronously and the numbered backups
//! `<path>.1` (newest) through `<path>.<n>` are renumbered on a background thread.
//!
//! # Examples
//!
//! Log to standard output:
//!
//! ```
//! let logger = rotalog::Logger::new();
//!
//! rotalog::info!(logger, "listening on port {}", 8080);
//! rotalog::warn!(logger; "disk usage at", 91, "percent");
//! ```
//!
//! Log to a rotating file, keeping three backups of up to 16 MiB each:
//!
//! ```no_run
//! use std::num::NonZeroU64;
//!
//! use rotalog::LevelFilter;
//! use rotalog::Logger;
//!
//! let logger = Logger::builder()
//!     .level(LevelFilter::Debug)
//!     .file("logs/app.log")
//!     .rollover_size(NonZeroU64::new(16 * rotalog::MEGABYTE).unwrap())
//!     .max_backups(3)
//!     .build()
//!     .unwrap();
//!
//! logger.info("ready");
//! ```
//!
//! Route the [`log`] facade into a logger:
//!
//! ```
//! let logger = rotalog::Logger::new().apply().unwrap();
//! logger.set_level(rotalog::LevelFilter::Debug);
//!
//! log::debug!("bridged");
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod buffer;
mod color;
mod config;
mod error;
mod level;
mod logger;
mod macros;
mod record;
mod rolling;
mod tag;
mod template;
mod trap;

#[doc(hidden)]
pub use macros::__private;

pub use self::color::LevelColor;
pub use self::config::Config;
pub use self::error::Error;
pub use self::level::Level;
pub use self::level::LevelFilter;
pub use self::level::ParseLevelError;
pub use self::level::should_emit;
pub use self::logger::Logger;
pub use self::logger::LoggerBuilder;
pub use self::record::Record;
pub use self::record::pid;
pub use self::rolling::MEGABYTE;
pub use self::tag::TagResolver;
pub use self::template::DEFAULT_FORMAT;
pub use self::template::Template;
pub use self::trap::DefaultTrap;
pub use self::trap::Trap;
