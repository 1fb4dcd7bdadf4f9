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

use std::fmt;
use std::io;
use std::io::Write;
use std::num::NonZeroU64;
use std::path::PathBuf;

use super::Logger;
use super::Output;
use crate::Config;
use crate::Error;
use crate::LevelFilter;
use crate::color::LevelColor;
use crate::record::Record;
use crate::rolling::MEGABYTE;
use crate::rolling::RollingFile;
use crate::tag::Tags;
use crate::template::DEFAULT_FORMAT;
use crate::template::Template;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

enum Sink {
    Stdout,
    Writer(Box<dyn Write + Send>),
    File(PathBuf),
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sink::Stdout => f.write_str("Stdout"),
            Sink::Writer(_) => f.write_str("Writer"),
            Sink::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

/// A builder for configuring a [`Logger`].
///
/// # Examples
///
/// ```no_run
/// use std::num::NonZeroU64;
///
/// use rotalog::LevelFilter;
/// use rotalog::Logger;
///
/// let logger = Logger::builder()
///     .level(LevelFilter::Debug)
///     .prefix("[api] ")
///     .file("logs/api.log")
///     .rollover_size(NonZeroU64::new(64 * 1024 * 1024).unwrap())
///     .max_backups(5)
///     .build()
///     .unwrap();
/// ```
#[must_use = "call `build` to construct the logger"]
#[derive(Debug)]
pub struct LoggerBuilder {
    sink: Sink,
    level: LevelFilter,
    prefix: String,
    format: String,
    rollover_size: Option<NonZeroU64>,
    max_backups: usize,
    color: bool,
    colors: LevelColor,
    tags: Tags,
    trap: Box<dyn Trap>,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggerBuilder {
    /// Create a builder for a logger writing to standard output at the `Info` threshold.
    pub fn new() -> Self {
        LoggerBuilder {
            sink: Sink::Stdout,
            level: LevelFilter::Info,
            prefix: String::new(),
            format: DEFAULT_FORMAT.to_string(),
            rollover_size: None,
            max_backups: 0,
            color: false,
            colors: LevelColor::default(),
            tags: Tags::default(),
            trap: Box::new(DefaultTrap::default()),
        }
    }

    /// Create a builder from a [`Config`].
    ///
    /// `max_size` is given in megabytes; zero disables size-based rotation.
    pub fn from_config(config: &Config) -> Self {
        let mut builder = LoggerBuilder::new()
            .level(config.level)
            .prefix(config.prefix.clone())
            .max_backups(config.backups);
        if let Some(format) = &config.format {
            builder = builder.format(format.clone());
        }
        if let Some(file) = &config.file {
            builder = builder.file(file.clone());
        }
        if let Some(size) = NonZeroU64::new(config.max_size.saturating_mul(MEGABYTE)) {
            builder = builder.rollover_size(size);
        }
        builder
    }

    /// Set the threshold.
    ///
    /// Default to [`LevelFilter::Info`].
    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Set the prefix rendered by `${prefix}`.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the record template.
    ///
    /// Default to [`DEFAULT_FORMAT`](crate::DEFAULT_FORMAT).
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Write records to `output`. Rotation does not apply to arbitrary writers.
    pub fn output(mut self, output: impl Write + Send + 'static) -> Self {
        self.sink = Sink::Writer(Box::new(output));
        self
    }

    /// Write records to the file at `path`.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sink = Sink::File(path.into());
        self
    }

    /// Rotate the log file once it holds at least `n` bytes.
    ///
    /// Without this the file grows without bound.
    pub fn rollover_size(mut self, n: NonZeroU64) -> Self {
        self.rollover_size = Some(n);
        self
    }

    /// Keep at most `n` rotated files. With `0`, rotated files are discarded.
    ///
    /// Default to `0`.
    pub fn max_backups(mut self, n: usize) -> Self {
        self.max_backups = n;
        self
    }

    /// Colorize level names.
    ///
    /// Default to `false`.
    pub fn color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Customize the level colors used when color is enabled.
    pub fn colors(mut self, colors: LevelColor) -> Self {
        self.colors = colors;
        self
    }

    /// Set the trap for errors that cannot be written to the sink.
    ///
    /// Default to [`DefaultTrap`].
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    /// Register a resolver for `${name}`, replacing any builtin of the same name.
    ///
    /// # Examples
    ///
    /// ```
    /// use rotalog::Logger;
    ///
    /// let logger = Logger::builder()
    ///     .format("${host} ${message}\n")
    ///     .tag("host", |_, buf| buf.extend_from_slice(b"web-1"))
    ///     .output(std::io::sink())
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn tag<F>(mut self, name: impl Into<String>, resolver: F) -> Self
    where
        F: Fn(&Record<'_>, &mut Vec<u8>) + Send + Sync + 'static,
    {
        self.tags.insert(name, resolver);
        self
    }

    /// Build the logger.
    ///
    /// # Errors
    ///
    /// Return an error if the log file cannot be opened.
    pub fn build(self) -> Result<Logger, Error> {
        let Self {
            sink,
            level,
            prefix,
            format,
            rollover_size,
            max_backups,
            color,
            colors,
            tags,
            trap,
        } = self;

        let output = match sink {
            Sink::Stdout => Output::Stream(Box::new(io::stdout())),
            Sink::Writer(writer) => Output::Stream(writer),
            Sink::File(path) => Output::File(RollingFile::open(path, rollover_size, max_backups)?),
        };

        Ok(Logger::from_parts(
            level,
            prefix,
            Template::compile(&format),
            output,
            colors,
            color,
            tags,
            trap,
        ))
    }
}
