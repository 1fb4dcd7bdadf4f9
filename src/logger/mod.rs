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

use std::backtrace::Backtrace;
use std::fmt;
use std::fmt::Write as _;
use std::io;
use std::io::Write;
use std::mem;
use std::num::NonZeroU64;
use std::panic::Location;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

pub use self::builder::LoggerBuilder;
use crate::Error;
use crate::Level;
use crate::LevelFilter;
use crate::buffer::BufferPool;
use crate::color::LevelColor;
use crate::level::should_emit;
use crate::record::Record;
use crate::rolling::RollingFile;
use crate::tag::Tags;
use crate::template::Template;
use crate::trap::Trap;

mod builder;
mod log_impl;

/// The sink records are written to.
enum Output {
    Stream(Box<dyn Write + Send>),
    File(RollingFile),
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Stream(_) => f.write_str("Stream"),
            Output::File(file) => f.debug_tuple("File").field(&file.path()).finish(),
        }
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stream(w) => w.write(buf),
            Output::File(file) => file.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Output::Stream(w) => w.write_all(buf),
            Output::File(file) => file.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stream(w) => w.flush(),
            Output::File(file) => file.flush(),
        }
    }
}

#[derive(Debug)]
struct State {
    prefix: String,
    template: Template,
    output: Output,
    colors: LevelColor,
    color: bool,
    // level names as rendered by `${level}`, indexed by `Level as usize`
    labels: [String; 5],
}

impl State {
    fn set_color(&mut self, color: bool) {
        self.color = color;
        self.labels = self.colors.labels(!color);
    }
}

/// A template-driven text logger.
///
/// A logger owns a severity threshold, a prefix, a [`Template`](crate::Template) and an output
/// sink. When bound to a file it rotates the file once it grows past a size limit, keeping a
/// bounded number of numbered backups next to it.
///
/// Every record is formatted and written under a single lock, so records from concurrent callers
/// never interleave. The threshold is checked before taking the lock.
///
/// # Examples
///
/// ```
/// use rotalog::LevelFilter;
/// use rotalog::Logger;
///
/// let logger = Logger::builder()
///     .level(LevelFilter::Warn)
///     .format("${level}: ${message}\n")
///     .output(std::io::sink())
///     .build()
///     .unwrap();
///
/// rotalog::info!(logger, "dropped");
/// rotalog::error!(logger, "boom {}", 7);
/// ```
pub struct Logger {
    threshold: AtomicUsize,
    state: Mutex<State>,
    tags: Tags,
    pool: BufferPool,
    trap: Box<dyn Trap>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("threshold", &self.level())
            .field("state", &self.state)
            .field("tags", &self.tags)
            .field("trap", &self.trap)
            .finish_non_exhaustive()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Create a logger writing to standard output with the default template and an `Info`
    /// threshold.
    pub fn new() -> Logger {
        Logger::from_parts(
            LevelFilter::Info,
            String::new(),
            Template::default(),
            Output::Stream(Box::new(io::stdout())),
            LevelColor::default(),
            false,
            Tags::default(),
            Box::new(crate::trap::DefaultTrap::default()),
        )
    }

    /// Create a new [`LoggerBuilder`].
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    #[allow(clippy::too_many_arguments)]
    fn from_parts(
        threshold: LevelFilter,
        prefix: String,
        template: Template,
        output: Output,
        colors: LevelColor,
        color: bool,
        tags: Tags,
        trap: Box<dyn Trap>,
    ) -> Logger {
        let labels = colors.labels(!color);
        Logger {
            threshold: AtomicUsize::new(threshold as usize),
            state: Mutex::new(State {
                prefix,
                template,
                output,
                colors,
                color,
                labels,
            }),
            tags,
            pool: BufferPool::default(),
            trap,
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The current threshold.
    pub fn level(&self) -> LevelFilter {
        LevelFilter::from_usize(self.threshold.load(Ordering::Relaxed))
    }

    /// Set the threshold. Records strictly below it are discarded before formatting.
    pub fn set_level(&self, level: LevelFilter) {
        self.threshold.store(level as usize, Ordering::Relaxed);
    }

    /// Whether a record of `level` would be emitted.
    pub fn enabled(&self, level: Level) -> bool {
        should_emit(level, self.level())
    }

    /// The current prefix.
    pub fn prefix(&self) -> String {
        self.state().prefix.clone()
    }

    /// Set the prefix rendered by the `${prefix}` tag.
    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.state().prefix = prefix.into();
    }

    /// Replace the template. Takes effect from the next record.
    pub fn set_format(&self, format: &str) {
        let template = Template::compile(format);
        self.state().template = template;
    }

    /// Write to `output` from now on.
    ///
    /// This disables rotation; the previously bound file, if any, is closed once its pending
    /// archive work finishes.
    pub fn set_output(&self, output: impl Write + Send + 'static) {
        self.replace_output(Output::Stream(Box::new(output)));
    }

    /// Bind the logger to the file at `path`.
    ///
    /// The file is opened for appending and created if missing, along with its parent directories.
    /// Once it holds at least `rollover_size` bytes it is rotated, keeping up to `backups`
    /// numbered backups. With `rollover_size` of `None` the file grows without bound.
    ///
    /// # Errors
    ///
    /// Return an error if the file cannot be opened; the current output is kept in that case.
    pub fn set_file(
        &self,
        path: impl Into<PathBuf>,
        rollover_size: Option<NonZeroU64>,
        backups: usize,
    ) -> Result<(), Error> {
        let file = RollingFile::open(path, rollover_size, backups)?;
        self.replace_output(Output::File(file));
        Ok(())
    }

    fn replace_output(&self, output: Output) {
        let previous = {
            let mut state = self.state();
            if let Err(err) = state.output.flush() {
                let err = Error::new("failed to flush previous output").with_source(err);
                self.report(&mut state, err);
            }
            mem::replace(&mut state.output, output)
        };
        // may wait for an archive job; keep it out of the critical section
        drop(previous);
    }

    /// The path of the active log file, if the logger is bound to one.
    pub fn file_path(&self) -> Option<PathBuf> {
        match &self.state().output {
            Output::File(file) => Some(file.path().to_path_buf()),
            Output::Stream(_) => None,
        }
    }

    /// Colorize level names from now on.
    pub fn enable_color(&self) {
        self.state().set_color(true);
    }

    /// Render plain level names from now on.
    pub fn disable_color(&self) {
        self.state().set_color(false);
    }

    /// Whether level names are colorized.
    pub fn is_color_enabled(&self) -> bool {
        self.state().color
    }

    /// Flush the output and wait for the in-flight archive job, if any.
    pub fn flush(&self) {
        let mut state = self.state();
        if let Err(err) = state.output.flush() {
            let err = Error::new("failed to flush log output").with_source(err);
            self.report(&mut state, err);
        }
        let err = match &mut state.output {
            Output::File(file) => file.wait_archive(),
            Output::Stream(_) => None,
        };
        if let Some(err) = err {
            self.report(&mut state, err);
        }
    }

    /// Write `message` and a newline straight to the output.
    ///
    /// Neither the threshold nor the template applies. The bytes count toward rotation.
    pub fn print(&self, message: impl fmt::Display) {
        let mut state = self.state();
        let mut buf = self.pool.acquire();
        let _ = writeln!(buf, "{message}");
        self.write(&mut state, &buf);
        self.pool.release(buf);
    }

    /// Emit a record at `level`. A `Fatal` record terminates the process as [`Logger::fatal`]
    /// does.
    #[track_caller]
    pub fn log(&self, level: Level, message: impl fmt::Display) {
        if level == Level::Fatal {
            self.fatal(message);
        }
        let location = Location::caller();
        self.emit(level, location.file(), location.line(), &message);
    }

    /// Emit a `Debug` record.
    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        let location = Location::caller();
        self.emit(Level::Debug, location.file(), location.line(), &message);
    }

    /// Emit an `Info` record.
    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        let location = Location::caller();
        self.emit(Level::Info, location.file(), location.line(), &message);
    }

    /// Emit a `Warn` record.
    #[track_caller]
    pub fn warn(&self, message: impl fmt::Display) {
        let location = Location::caller();
        self.emit(Level::Warn, location.file(), location.line(), &message);
    }

    /// Emit an `Error` record.
    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        let location = Location::caller();
        self.emit(Level::Error, location.file(), location.line(), &message);
    }

    /// Emit a `Fatal` record with a backtrace of the calling thread appended, then exit the
    /// process with status 1.
    ///
    /// The process exits even when the threshold discards the record.
    #[track_caller]
    pub fn fatal(&self, message: impl fmt::Display) -> ! {
        let location = Location::caller();
        self.emit(Level::Fatal, location.file(), location.line(), &message);
        self.flush();
        std::process::exit(1)
    }

    pub(crate) fn emit(&self, level: Level, file: &str, line: u32, message: &dyn fmt::Display) {
        if !self.enabled(level) {
            return;
        }

        let mut text = message.to_string();
        if level == Level::Fatal {
            let _ = write!(text, "\n{}", Backtrace::force_capture());
        }

        let mut state = self.state();
        let archive_error = match &mut state.output {
            Output::File(file) => file.poll_archive(),
            Output::Stream(_) => None,
        };
        if let Some(err) = archive_error {
            self.report(&mut state, err);
        }

        let mut buf = self.pool.acquire();
        self.render(&state, level, file, line, &text, &mut buf);
        self.write(&mut state, &buf);
        self.pool.release(buf);
    }

    fn render(
        &self,
        state: &State,
        level: Level,
        file: &str,
        line: u32,
        message: &str,
        buf: &mut Vec<u8>,
    ) {
        let label = &state.labels[level as usize];
        let record = Record::new(level, label, &state.prefix, file, line, message);
        state
            .template
            .execute(buf, |name, buf| self.tags.resolve(name, &record, buf));
    }

    /// Write `bytes`, then rotate if they pushed the file over its limit.
    fn write(&self, state: &mut State, bytes: &[u8]) {
        if let Err(err) = state.output.write_all(bytes) {
            let err = Error::new("failed to write log record").with_source(err);
            self.report(state, err);
        }

        let errors = match &mut state.output {
            Output::File(file) if file.should_rollover() => file.rollover(),
            _ => vec![],
        };
        for err in errors {
            self.report(state, err);
        }
    }

    /// Write `err` as an ERROR record, falling back to the trap if that fails.
    ///
    /// Never rotates, so a failing rotation cannot recurse.
    fn report(&self, state: &mut State, err: Error) {
        if !self.enabled(Level::Error) {
            return;
        }

        let mut buf = self.pool.acquire();
        self.render(state, Level::Error, file!(), line!(), &err.to_string(), &mut buf);
        if let Err(write_err) = state.output.write_all(&buf) {
            let err = Error::new("failed to report logging error")
                .with_source(err)
                .with_source(write_err);
            self.trap.trap(&err);
        }
        self.pool.release(buf);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("sink is gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[derive(Debug, Clone, Default)]
    struct CountingTrap(Arc<Mutex<Vec<String>>>);

    impl Trap for CountingTrap {
        fn trap(&self, err: &Error) {
            self.0.lock().unwrap().push(err.to_string());
        }
    }

    fn logger(format: &str) -> (Logger, Captured) {
        let captured = Captured::default();
        let logger = Logger::builder()
            .level(LevelFilter::Debug)
            .format(format)
            .output(captured.clone())
            .build()
            .unwrap();
        (logger, captured)
    }

    #[test]
    fn test_threshold_filters_records() {
        let (logger, captured) = logger("${level} ${message}\n");
        logger.set_level(LevelFilter::Warn);
        logger.debug("d");
        logger.info("i");
        logger.warn("w");
        logger.error("e");
        assert_eq!(captured.text(), "WARN w\nERROR e\n");

        logger.set_level(LevelFilter::Off);
        logger.error("hidden");
        assert_eq!(captured.text(), "WARN w\nERROR e\n");
    }

    #[test]
    fn test_macros_respect_threshold_and_prefix() {
        let captured = Captured::default();
        let logger = Logger::builder()
            .level(LevelFilter::Warn)
            .prefix("svc")
            .format("${level}: ${message}\n")
            .output(captured.clone())
            .build()
            .unwrap();

        crate::info!(logger, "x");
        assert_eq!(captured.text(), "");
        crate::error!(logger, "boom {}", 7);
        assert_eq!(captured.text(), "ERROR: boom 7\n");
        assert_eq!(logger.prefix(), "svc");
    }

    #[test]
    fn test_caller_location_is_the_call_site() {
        let (logger, captured) = logger("${short_file}:${line}");
        let line = line!() + 1;
        logger.info("here");
        assert_eq!(captured.text(), format!("mod.rs:{line}"));
    }

    #[test]
    fn test_mutators_apply_to_next_record() {
        let (logger, captured) = logger("${message}\n");
        logger.info("one");
        logger.set_format("${prefix}|${message}\n");
        logger.set_prefix("svc");
        assert_eq!(logger.prefix(), "svc");
        logger.info("two");
        assert_eq!(captured.text(), "one\nsvc|two\n");
    }

    #[test]
    fn test_print_bypasses_filter_and_template() {
        let (logger, captured) = logger("${level} ${message}\n");
        logger.set_level(LevelFilter::Off);
        logger.print(format_args!("raw {}", 1));
        assert_eq!(captured.text(), "raw 1\n");
    }

    #[test]
    fn test_set_output_switches_sink() {
        let (logger, first) = logger("${message}\n");
        logger.info("a");
        let second = Captured::default();
        logger.set_output(second.clone());
        logger.info("b");
        assert_eq!(first.text(), "a\n");
        assert_eq!(second.text(), "b\n");
        assert!(logger.file_path().is_none());
    }

    #[test]
    fn test_color_toggle() {
        let (logger, _) = logger("${level}");
        assert!(!logger.is_color_enabled());
        logger.enable_color();
        assert!(logger.is_color_enabled());
        logger.disable_color();
        assert!(!logger.is_color_enabled());
        assert_eq!(logger.state().labels[Level::Warn as usize], "WARN");
    }

    #[test]
    fn test_enabled_color_reaches_the_sink() {
        let captured = Captured::default();
        let logger = Logger::builder()
            .color(true)
            .format("${level}|${message}\n")
            .output(captured.clone())
            .build()
            .unwrap();

        logger.info("x");
        assert_eq!(captured.text(), "\x1b[32mINFO\x1b[0m|x\n");

        logger.disable_color();
        logger.info("y");
        assert!(captured.text().ends_with("\x1b[0m|x\nINFO|y\n"));
    }

    #[test]
    fn test_write_failure_goes_to_trap() {
        let trap = CountingTrap::default();
        let logger = Logger::builder()
            .output(Broken)
            .trap(trap.clone())
            .build()
            .unwrap();
        logger.info("lost");

        let trapped = trap.0.lock().unwrap();
        assert_eq!(trapped.len(), 1);
        assert!(trapped[0].starts_with("failed to report logging error"), "{}", trapped[0]);
        assert!(trapped[0].contains("sink is gone"), "{}", trapped[0]);
    }

    #[test]
    fn test_log_dispatches_by_level() {
        let (logger, captured) = logger("${level}:${message} ");
        logger.log(Level::Debug, "a");
        logger.log(Level::Error, 42);
        assert_eq!(captured.text(), "DEBUG:a ERROR:42 ");
    }
}
