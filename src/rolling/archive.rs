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

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::thread::JoinHandle;

use crossbeam_channel::Receiver;
use crossbeam_channel::SendError;
use crossbeam_channel::Sender;
use crossbeam_channel::TryRecvError;
use crossbeam_channel::bounded;
use crossbeam_channel::unbounded;

use crate::Error;

/// `<path>.<suffix>`
fn with_suffix(path: &Path, suffix: impl AsRef<str>) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(suffix.as_ref());
    PathBuf::from(name)
}

pub(crate) fn staging_path(path: &Path) -> PathBuf {
    with_suffix(path, "tmp")
}

pub(crate) fn backup_path(path: &Path, index: usize) -> PathBuf {
    with_suffix(path, index.to_string())
}

/// The backup index of `filename` if it is named `<base>.<N>` with a positive integer `N`.
fn backup_index(filename: &str, base: &str) -> Option<usize> {
    let suffix = filename.strip_prefix(base)?.strip_prefix('.')?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse::<usize>().ok().filter(|&n| n > 0)
}

/// Shift every backup up by one slot and install the staged file as backup `1`.
#[derive(Debug, Clone)]
pub(crate) struct ArchiveJob {
    pub(crate) path: PathBuf,
    pub(crate) staged: PathBuf,
    pub(crate) backups: usize,
}

impl ArchiveJob {
    pub(crate) fn run(&self) -> Result<(), Error> {
        let path = &self.path;
        let base = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::new("log filename is not valid UTF-8"))?;
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let read_dir = fs::read_dir(dir)
            .map_err(|err| Error::from_path_io("failed to read log dir", dir, err))?;

        let mut indices = read_dir
            .filter_map(|entry| {
                let entry = entry.ok()?;
                // only files are ever rotated
                if !entry.file_type().ok()?.is_file() {
                    return None;
                }
                let filename = entry.file_name();
                backup_index(filename.to_str()?, base)
            })
            .collect::<Vec<_>>();

        // highest first, so no rename overwrites a backup that has yet to move
        indices.sort_unstable_by(|a, b| b.cmp(a));

        let mut failures: Vec<io::Error> = vec![];
        for index in indices {
            let backup = backup_path(path, index);
            let result = if index >= self.backups {
                fs::remove_file(&backup)
            } else {
                fs::rename(&backup, backup_path(path, index + 1))
            };
            if let Err(err) = result {
                failures.push(err);
            }
        }

        let result = if self.backups == 0 {
            fs::remove_file(&self.staged)
        } else {
            fs::rename(&self.staged, backup_path(path, 1))
        };
        if let Err(err) = result {
            failures.push(err);
        }

        if failures.is_empty() {
            return Ok(());
        }
        let mut err =
            Error::new("failed to archive rotated log").with_context("path", path.display());
        for failure in failures {
            err = err.with_source(failure);
        }
        Err(err)
    }
}

#[derive(Debug)]
struct Request {
    job: ArchiveJob,
    done: Sender<Result<(), Error>>,
}

/// A single background worker running archive jobs in submission order.
///
/// The worker thread is spawned on first use and stops once the archiver is dropped, after
/// draining the jobs already queued.
#[derive(Debug)]
pub(crate) struct Archiver {
    thread_name: String,
    sender: Option<Sender<Request>>,
    handle: Option<JoinHandle<()>>,
    pending: Option<Receiver<Result<(), Error>>>,
}

impl Archiver {
    pub(crate) fn new(thread_name: impl Into<String>) -> Self {
        Self {
            thread_name: thread_name.into(),
            sender: None,
            handle: None,
            pending: None,
        }
    }

    fn sender(&mut self) -> io::Result<Sender<Request>> {
        if let Some(sender) = &self.sender {
            return Ok(sender.clone());
        }

        let (sender, receiver) = unbounded::<Request>();
        let handle = std::thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || {
                for Request { job, done } in receiver.iter() {
                    let _ = done.send(job.run());
                }
            })?;
        self.sender = Some(sender.clone());
        self.handle = Some(handle);
        Ok(sender)
    }

    /// Queue `job`. Without a worker the job runs inline.
    pub(crate) fn submit(&mut self, job: ArchiveJob) {
        let (done, pending) = bounded(1);
        let request = Request { job, done };

        let (request, spawn_error) = match self.sender() {
            Ok(sender) => match sender.send(request) {
                Ok(()) => {
                    self.pending = Some(pending);
                    return;
                }
                Err(SendError(request)) => (request, None),
            },
            Err(err) => (request, Some(err)),
        };

        let result = match (request.job.run(), spawn_error) {
            (result, None) => result,
            (result, Some(err)) => {
                let err = Error::new("failed to spawn archive worker").with_source(err);
                match result {
                    Ok(()) => Err(err),
                    Err(archive_err) => Err(err.with_source(archive_err)),
                }
            }
        };
        let _ = request.done.send(result);
        self.pending = Some(pending);
    }

    /// The outcome of the in-flight job, if it has finished.
    pub(crate) fn poll(&mut self) -> Option<Result<(), Error>> {
        let pending = self.pending.as_ref()?;
        let result = match pending.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                Err(Error::new("archive worker exited unexpectedly"))
            }
        };
        self.pending = None;
        Some(result)
    }

    /// Block until the in-flight job, if any, finishes.
    pub(crate) fn wait(&mut self) -> Option<Result<(), Error>> {
        let pending = self.pending.take()?;
        Some(
            pending
                .recv()
                .unwrap_or_else(|_| Err(Error::new("archive worker exited unexpectedly"))),
        )
    }
}

impl Drop for Archiver {
    fn drop(&mut self) {
        // disconnecting the channel lets the worker finish queued jobs and exit
        self.sender = None;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn touch(path: &Path, content: &str) {
        fs::write(path, content).unwrap();
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_backup_index() {
        assert_eq!(backup_index("app.log.1", "app.log"), Some(1));
        assert_eq!(backup_index("app.log.12", "app.log"), Some(12));
        assert_eq!(backup_index("app.log", "app.log"), None);
        assert_eq!(backup_index("app.log.0", "app.log"), None);
        assert_eq!(backup_index("app.log.tmp", "app.log"), None);
        assert_eq!(backup_index("app.log.+3", "app.log"), None);
        assert_eq!(backup_index("app.log.1.gz", "app.log"), None);
        assert_eq!(backup_index("app.logx.1", "app.log"), None);
        assert_eq!(backup_index("other.1", "app.log"), None);
    }

    #[test]
    fn test_suffixed_paths() {
        let path = Path::new("/var/log/app.log");
        assert_eq!(staging_path(path), Path::new("/var/log/app.log.tmp"));
        assert_eq!(backup_path(path, 3), Path::new("/var/log/app.log.3"));
    }

    #[test]
    fn test_shift_and_install() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        touch(&backup_path(&path, 1), "first");
        touch(&backup_path(&path, 2), "second");
        touch(&staging_path(&path), "latest");

        let job = ArchiveJob {
            staged: staging_path(&path),
            path: path.clone(),
            backups: 3,
        };
        job.run().unwrap();

        assert_eq!(read(&backup_path(&path, 1)), "latest");
        assert_eq!(read(&backup_path(&path, 2)), "first");
        assert_eq!(read(&backup_path(&path, 3)), "second");
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn test_evicts_beyond_retention() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        touch(&backup_path(&path, 1), "first");
        touch(&backup_path(&path, 2), "second");
        // left over from a larger retention limit
        touch(&backup_path(&path, 5), "ancient");
        touch(&staging_path(&path), "latest");
        touch(&dir.path().join("unrelated.1"), "keep me");

        let job = ArchiveJob {
            staged: staging_path(&path),
            path: path.clone(),
            backups: 2,
        };
        job.run().unwrap();

        assert_eq!(read(&backup_path(&path, 1)), "latest");
        assert_eq!(read(&backup_path(&path, 2)), "first");
        assert!(!backup_path(&path, 3).exists());
        assert!(!backup_path(&path, 5).exists());
        assert_eq!(read(&dir.path().join("unrelated.1")), "keep me");
    }

    #[test]
    fn test_zero_backups_discards_rotated_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        touch(&backup_path(&path, 1), "first");
        touch(&staging_path(&path), "latest");

        let job = ArchiveJob {
            staged: staging_path(&path),
            path: path.clone(),
            backups: 0,
        };
        job.run().unwrap();

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_staged_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");

        let job = ArchiveJob {
            staged: staging_path(&path),
            path: path.clone(),
            backups: 2,
        };
        let err = job.run().unwrap_err();
        assert_eq!(err.message(), "failed to archive rotated log");
        assert_eq!(err.sources().len(), 1);
    }

    #[test]
    fn test_listing_failure_aborts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("app.log");

        let job = ArchiveJob {
            staged: staging_path(&path),
            path,
            backups: 2,
        };
        let err = job.run().unwrap_err();
        assert_eq!(err.message(), "failed to read log dir");
    }

    #[test]
    fn test_archiver_runs_jobs_in_background() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let mut archiver = Archiver::new("rotalog-archive-test");
        assert!(archiver.poll().is_none());
        assert!(archiver.wait().is_none());

        for content in ["one", "two", "three"] {
            touch(&staging_path(&path), content);
            archiver.submit(ArchiveJob {
                staged: staging_path(&path),
                path: path.clone(),
                backups: 2,
            });
            archiver.wait().unwrap().unwrap();
        }

        assert_eq!(read(&backup_path(&path, 1)), "three");
        assert_eq!(read(&backup_path(&path, 2)), "two");
        assert!(!backup_path(&path, 3).exists());
    }
}
