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

//! Color utilities.

use colored::Color;

use crate::Level;

/// Colors for different log levels.
///
/// `fatal` is applied as a background color; the others color the text.
#[derive(Debug, Clone)]
pub struct LevelColor {
    /// Color for debug level logs.
    pub debug: Color,
    /// Color for info level logs.
    pub info: Color,
    /// Color for warning level logs.
    pub warn: Color,
    /// Color for error level logs.
    pub error: Color,
    /// Background color for fatal level logs.
    pub fatal: Color,
}

impl Default for LevelColor {
    fn default() -> Self {
        Self {
            debug: Color::Blue,
            info: Color::Green,
            warn: Color::Yellow,
            error: Color::Red,
            fatal: Color::Red,
        }
    }
}

impl LevelColor {
    /// Colorize the log level.
    ///
    /// Escape sequences are emitted whenever `no_color` is false, regardless of where the output
    /// goes or what the environment asks for.
    pub fn colorize_record_level(&self, no_color: bool, level: Level) -> String {
        let name = level.as_str();
        if no_color {
            return name.to_string();
        }

        let code = match level {
            Level::Debug => self.debug.to_fg_str(),
            Level::Info => self.info.to_fg_str(),
            Level::Warn => self.warn.to_fg_str(),
            Level::Error => self.error.to_fg_str(),
            Level::Fatal => self.fatal.to_bg_str(),
        };
        format!("\x1b[{code}m{name}\x1b[0m")
    }

    /// Render the label of every level once, indexed by `Level as usize`.
    pub(crate) fn labels(&self, no_color: bool) -> [String; 5] {
        Level::ALL.map(|level| self.colorize_record_level(no_color, level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_color_labels_are_plain() {
        let labels = LevelColor::default().labels(true);
        assert_eq!(labels, ["DEBUG", "INFO", "WARN", "ERROR", "FATAL"]);
    }

    #[test]
    fn test_color_labels_carry_escape_codes() {
        let labels = LevelColor::default().labels(false);
        assert_eq!(labels[Level::Debug as usize], "\x1b[34mDEBUG\x1b[0m");
        assert_eq!(labels[Level::Info as usize], "\x1b[32mINFO\x1b[0m");
        assert_eq!(labels[Level::Warn as usize], "\x1b[33mWARN\x1b[0m");
        assert_eq!(labels[Level::Error as usize], "\x1b[31mERROR\x1b[0m");
        assert_eq!(labels[Level::Fatal as usize], "\x1b[41mFATAL\x1b[0m");
    }
}
