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

use super::Logger;
use crate::Level;

/// Bridges records from the [`log`] crate into a [`Logger`].
///
/// `Trace` records are emitted as `Debug`. The `log` facade has no fatal level, so records
/// arriving through it never terminate the process.
impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        Logger::enabled(self, Level::from(metadata.level()))
    }

    fn log(&self, record: &log::Record) {
        let level = Level::from(record.level());
        let file = record.file().unwrap_or("<unknown>");
        let line = record.line().unwrap_or(0);
        self.emit(level, file, line, record.args());
    }

    fn flush(&self) {
        Logger::flush(self);
    }
}

impl Logger {
    /// Install this logger as the process-wide [`log`] backend.
    ///
    /// The logger is leaked to obtain the `'static` lifetime the facade requires, and the `log`
    /// max level is opened fully so that the logger's own threshold decides. The returned
    /// reference keeps the runtime mutators available.
    ///
    /// # Errors
    ///
    /// Return an error if a global logger has already been set.
    pub fn apply(self) -> Result<&'static Logger, log::SetLoggerError> {
        let logger: &'static Logger = Box::leak(Box::new(self));
        log::set_logger(logger)?;
        log::set_max_level(log::LevelFilter::Trace);
        Ok(logger)
    }
}
