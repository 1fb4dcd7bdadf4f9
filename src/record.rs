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

//! The per-call log record.

use std::sync::LazyLock;

use jiff::Zoned;

use crate::Level;

static PID: LazyLock<String> = LazyLock::new(|| std::process::id().to_string());

/// The process id, rendered once.
pub fn pid() -> &'static str {
    &PID
}

/// The payload of a log message, as seen by tag resolvers.
///
/// Records are built for a single emit call and never outlive it.
#[derive(Clone, Debug)]
pub struct Record<'a> {
    level: Level,
    level_label: &'a str,
    time: Zoned,
    prefix: &'a str,
    file: &'a str,
    line: u32,
    message: &'a str,
}

impl<'a> Record<'a> {
    pub(crate) fn new(
        level: Level,
        level_label: &'a str,
        prefix: &'a str,
        file: &'a str,
        line: u32,
        message: &'a str,
    ) -> Self {
        Record {
            level,
            level_label,
            time: Zoned::now(),
            prefix,
            file,
            line,
            message,
        }
    }

    /// The severity of the record.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The severity name as rendered by the logger, colorized if color is enabled.
    pub fn level_label(&self) -> &'a str {
        self.level_label
    }

    /// The observed time.
    pub fn time(&self) -> &Zoned {
        &self.time
    }

    /// The logger prefix.
    pub fn prefix(&self) -> &'a str {
        self.prefix
    }

    /// The source file of the call site, as recorded by the compiler.
    pub fn file(&self) -> &'a str {
        self.file
    }

    /// The base filename of the call site.
    pub fn short_file(&self) -> &'a str {
        split_last(self.file).1
    }

    /// The parent directory and base filename of the call site, e.g. `src/main.rs`.
    pub fn mid_file(&self) -> &'a str {
        let (dir, _) = split_last(self.file);
        match dir {
            None => self.file,
            Some(dir) => {
                let start = split_last(dir).0.map_or(0, |parent| parent.len() + 1);
                &self.file[start..]
            }
        }
    }

    /// The line of the call site.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The formatted message body.
    pub fn message(&self) -> &'a str {
        self.message
    }
}

// (directory, basename); the directory has no trailing separator
fn split_last(path: &str) -> (Option<&str>, &str) {
    match path.rfind(['/', '\\']) {
        Some(pos) => (Some(&path[..pos]), &path[pos + 1..]),
        None => (None, path),
    }
}
