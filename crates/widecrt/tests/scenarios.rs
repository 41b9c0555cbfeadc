#![cfg(unix)]

//! End-to-end scenarios that run relative to the working
//! directory.

use std::path::{Path, PathBuf};

use serial_test::serial;
use test_log::test;
use tracing::debug;
use widecrt::{Errno, Error, WideBuf, WideCString, WideChar};

fn wide(s: &str) -> WideCString {
    WideCString::from_str(s).unwrap()
}

/// Changes into a fresh temporary directory and restores the
/// previous working directory on drop.
struct Scratch {
    dir: tempfile::TempDir,
    prev: PathBuf,
}

impl Scratch {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let prev = std::env::current_dir().unwrap();
        let path = wide(dir.path().to_str().unwrap());
        widecrt::change_directory(&path).unwrap();
        debug!(path = ?dir.path(), "using tempdir");
        Self { dir, prev }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.prev);
    }
}

#[test]
#[serial]
fn chdir_into_non_ascii_directory() {
    let scratch = Scratch::new();
    std::fs::create_dir(scratch.path().join("données")).unwrap();

    widecrt::change_directory(&wide("données")).unwrap();

    let cwd = widecrt::current_directory(WideBuf::Allocate).unwrap();
    let cwd = cwd.to_string().unwrap();
    assert!(cwd.ends_with("/données"), "{cwd}");
    assert_eq!(
        PathBuf::from(&cwd),
        std::fs::canonicalize(scratch.path().join("données")).unwrap()
    );
}

#[test]
#[serial]
fn chdir_into_missing_directory() {
    let _scratch = Scratch::new();
    assert_eq!(
        widecrt::change_directory(&wide("absent")),
        Err(Error::Os(Errno::ENOENT))
    );
}

#[test]
#[serial]
fn create_then_remove() {
    let scratch = Scratch::new();

    let f = widecrt::open_file(&wide("test.txt"), &wide("w")).unwrap();
    f.close().unwrap();
    assert!(scratch.path().join("test.txt").exists());

    widecrt::remove_file(&wide("test.txt")).unwrap();
    assert!(!scratch.path().join("test.txt").exists());
}

#[test]
#[serial]
fn rename_then_open_old_name() {
    let scratch = Scratch::new();
    std::fs::write(scratch.path().join("a.txt"), b"a").unwrap();

    widecrt::rename_file(&wide("a.txt"), &wide("b.txt")).unwrap();

    let err = widecrt::open_file(&wide("a.txt"), &wide("r")).unwrap_err();
    assert_eq!(err, Error::Os(Errno::ENOENT));
    assert_eq!(std::fs::read(scratch.path().join("b.txt")).unwrap(), b"a");
}

#[test]
#[serial]
fn full_path_of_relative_path() {
    let scratch = Scratch::new();
    std::fs::create_dir(scratch.path().join("sub")).unwrap();
    std::os::unix::fs::symlink("sub", scratch.path().join("link")).unwrap();

    let got = widecrt::full_path(&wide("./link/../sub"), WideBuf::Allocate).unwrap();
    let want = std::fs::canonicalize(scratch.path().join("sub")).unwrap();
    assert_eq!(got.to_string().unwrap(), want.to_str().unwrap());
}

#[test]
#[serial]
fn current_directory_into_small_buffer() {
    let scratch = Scratch::new();
    let want = std::fs::canonicalize(scratch.path()).unwrap();
    let need = want.to_str().unwrap().chars().count() + 1;

    let mut buf: Vec<WideChar> = vec![0x55; need - 1];
    assert_eq!(
        widecrt::current_directory(WideBuf::Caller(&mut buf)),
        Err(Error::RangeTooSmall)
    );
    assert!(buf.iter().all(|&c| c == 0x55), "partial write");

    let mut buf: Vec<WideChar> = vec![0x55; need];
    let got = widecrt::current_directory(WideBuf::Caller(&mut buf)).unwrap();
    assert_eq!(got.to_string().unwrap(), want.to_str().unwrap());
}
