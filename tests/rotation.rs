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
use std::num::NonZeroU64;
use std::path::Path;
use std::path::PathBuf;

use rotalog::Logger;
use tempfile::TempDir;

fn backup(path: &Path, index: usize) -> PathBuf {
    PathBuf::from(format!("{}.{index}", path.display()))
}

fn backups_on_disk(dir: &Path) -> Vec<String> {
    let mut names = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .filter(|name| name != "app.log")
        .collect::<Vec<_>>();
    names.sort();
    names
}

fn file_logger(path: &Path, max_size: u64, backups: usize) -> Logger {
    Logger::builder()
        .format("${message}\n")
        .file(path)
        .rollover_size(NonZeroU64::new(max_size).unwrap())
        .max_backups(backups)
        .build()
        .unwrap()
}

#[test]
fn test_every_record_past_the_limit_rotates() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    let logger = file_logger(&path, 1, 2);

    logger.info("a");
    logger.info("b");
    logger.info("c");
    logger.flush();

    // the third rotation evicted the record of the first
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
    assert_eq!(fs::read_to_string(backup(&path, 1)).unwrap(), "c\n");
    assert_eq!(fs::read_to_string(backup(&path, 2)).unwrap(), "b\n");
    assert_eq!(backups_on_disk(dir.path()), ["app.log.1", "app.log.2"]);
}

#[test]
fn test_backup_count_is_bounded() {
    for backups in 0..4 {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let logger = file_logger(&path, 8, backups);

        for rotations in 1..=6usize {
            // 8 bytes including the newline, one rotation each
            logger.info(format_args!("rec-{rotations:03}"));
            logger.flush();

            let expected = rotations.min(backups);
            let on_disk = backups_on_disk(dir.path());
            assert_eq!(on_disk.len(), expected, "backups={backups}: {on_disk:?}");

            // `.1` is always the newest
            for index in 1..=expected {
                let content = fs::read_to_string(backup(&path, index)).unwrap();
                assert_eq!(content, format!("rec-{:03}\n", rotations + 1 - index));
            }
        }
    }
}

#[test]
fn test_no_rotation_below_the_limit() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    let logger = file_logger(&path, 1024, 3);

    for i in 0..10 {
        logger.info(i);
    }
    logger.flush();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 10);
    assert!(backups_on_disk(dir.path()).is_empty());
}

#[test]
fn test_reopened_file_counts_existing_bytes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    fs::write(&path, "0123456789\n").unwrap();

    let logger = file_logger(&path, 20, 1);
    logger.info("tail");
    logger.flush();
    assert_eq!(fs::read_to_string(&path).unwrap(), "0123456789\ntail\n");
    assert!(backups_on_disk(dir.path()).is_empty());

    logger.info("over");
    logger.flush();
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
    assert_eq!(
        fs::read_to_string(backup(&path, 1)).unwrap(),
        "0123456789\ntail\nover\n"
    );
}

#[test]
fn test_print_counts_toward_rotation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    let logger = file_logger(&path, 5, 1);

    logger.print("raw");
    assert_eq!(fs::read_to_string(&path).unwrap(), "raw\n");
    logger.print("x");
    logger.flush();

    assert_eq!(fs::read_to_string(&path).unwrap(), "");
    assert_eq!(fs::read_to_string(backup(&path, 1)).unwrap(), "raw\nx\n");
}

#[test]
fn test_set_file_rebinds_a_running_logger() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.log");
    let second = dir.path().join("nested").join("second.log");

    let logger = Logger::builder()
        .format("${message}\n")
        .file(&first)
        .build()
        .unwrap();
    logger.info("one");
    logger.set_file(&second, None, 0).unwrap();
    logger.info("two");
    logger.flush();

    assert_eq!(logger.file_path(), Some(second.clone()));
    assert_eq!(fs::read_to_string(&first).unwrap(), "one\n");
    assert_eq!(fs::read_to_string(&second).unwrap(), "two\n");
}

#[test]
fn test_archive_failure_is_logged_into_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    // a directory in the slot of backup 1 makes installing the rotated file fail
    fs::create_dir(backup(&path, 1)).unwrap();

    let logger = file_logger(&path, 4, 2);
    logger.info("first");
    logger.flush();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("failed to archive rotated log"), "{content}");
}
