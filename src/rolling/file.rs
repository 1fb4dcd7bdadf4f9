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

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::num::NonZeroU64;
use std::path::Path;
use std::path::PathBuf;

use crate::Error;
use crate::rolling::archive::ArchiveJob;
use crate::rolling::archive::Archiver;
use crate::rolling::archive::staging_path;

/// The active log file and its byte counter.
///
/// `size` counts the bytes of the file currently open at `path`, including what it held when it
/// was opened.
#[derive(Debug)]
pub(crate) struct RollingFile {
    path: PathBuf,
    file: File,
    size: u64,
    max_size: Option<NonZeroU64>,
    // normally `max_size`; pushed further out after an abandoned rotation
    rollover_at: u64,
    backups: usize,
    archiver: Archiver,
}

fn open_append(path: &Path) -> Result<(File, u64), Error> {
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|err| Error::from_path_io("failed to open log file", path, err))?;
    let size = file
        .metadata()
        .map_err(|err| Error::from_path_io("failed to stat log file", path, err))?
        .len();
    Ok((file, size))
}

impl RollingFile {
    pub(crate) fn open(
        path: impl Into<PathBuf>,
        max_size: Option<NonZeroU64>,
        backups: usize,
    ) -> Result<Self, Error> {
        let path = path.into();
        if path.file_name().is_none() {
            return Err(Error::new("log filename must not be empty")
                .with_context("path", path.display()));
        }

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .map_err(|err| Error::from_path_io("failed to create log directory", dir, err))?;
        }

        let (file, size) = open_append(&path)?;
        Ok(RollingFile {
            archiver: Archiver::new("rotalog-archive"),
            rollover_at: max_size.map_or(u64::MAX, NonZeroU64::get),
            path,
            file,
            size,
            max_size,
            backups,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn should_rollover(&self) -> bool {
        self.max_size.is_some() && self.size >= self.rollover_at
    }

    /// Retire the active file and open a fresh one at the same path.
    ///
    /// Never fails the write path: errors are returned for reporting, and on failure the logger
    /// keeps writing to whichever file handle is still open.
    pub(crate) fn rollover(&mut self) -> Vec<Error> {
        let mut errors = vec![];
        let max_size = self.max_size.map_or(u64::MAX, NonZeroU64::get);

        // the staging name is shared, so the previous archive must be done with it
        if let Some(Err(err)) = self.archiver.wait() {
            errors.push(err);
        }

        let staged = staging_path(&self.path);
        match fs::remove_file(&staged) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => errors.push(Error::from_path_io(
                "failed to remove stale rotated log",
                &staged,
                err,
            )),
        }

        if let Err(err) = self.file.flush() {
            errors.push(Error::new("failed to flush previous writer").with_source(err));
        }

        let archive = match fs::rename(&self.path, &staged) {
            Ok(()) => true,
            // the active file was removed underneath us; start a new one in its place
            Err(err) if err.kind() == io::ErrorKind::NotFound => false,
            Err(err) => {
                errors.push(Error::from_path_io("failed to rotate log", &self.path, err));
                self.rollover_at = self.size.saturating_add(max_size);
                return errors;
            }
        };

        match open_append(&self.path) {
            Ok((file, size)) => {
                self.file = file;
                self.size = size;
                self.rollover_at = max_size;
            }
            Err(err) => {
                errors.push(err);
                self.rollover_at = self.size.saturating_add(max_size);
            }
        }

        if archive {
            self.archiver.submit(ArchiveJob {
                path: self.path.clone(),
                staged,
                backups: self.backups,
            });
        }

        errors
    }

    /// The error of a finished archive job, without blocking.
    pub(crate) fn poll_archive(&mut self) -> Option<Error> {
        self.archiver.poll().and_then(Result::err)
    }

    /// Wait for the in-flight archive job and return its error, if any.
    pub(crate) fn wait_archive(&mut self) -> Option<Error> {
        self.archiver.wait().and_then(Result::err)
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf).inspect(|&n| self.size += n as u64)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
