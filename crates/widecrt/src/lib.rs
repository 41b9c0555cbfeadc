//! POSIX implementations of the Windows wide-character CRT path
//! and file APIs.
//!
//! Code written against `_wchdir`, `_wgetcwd`, `_wfullpath`,
//! `_wfopen`, `_wremove`, `_wrename`, `_get_pgmptr` and
//! `MultiByteToWideChar` can run unmodified on POSIX systems.
//! Wide arguments are encoded into the process multibyte
//! encoding (UTF-8), handed to the byte-string libc primitive,
//! and any wide result is decoded again.
//!
//! Rust callers use the platform-neutral functions at the crate
//! root, such as [`current_directory`]; C callers use [`ffi`],
//! which keeps the CRT's sentinel-plus-`errno` convention.
//!
//! # Operating System Support
//!
//! - Linux
//! - MacOS
//! - Windows (passes straight through to the CRT)
//!
//! # Features
//!
//! - `capi`: Export the [`ffi`] functions as unmangled C
//!   symbols on non-Windows targets.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(test), deny(clippy::expect_used, clippy::unwrap_used))]
#![deny(
    clippy::implicit_saturating_sub,
    clippy::missing_panics_doc,
    clippy::ptr_as_ptr,
    clippy::string_slice,
    clippy::transmute_ptr_to_ptr,
    clippy::undocumented_unsafe_blocks,
    clippy::unimplemented,
    clippy::wildcard_imports,
    missing_docs
)]

mod api;
mod buf;
pub mod conv;
mod errno;
mod error;
pub mod ffi;
mod file;
pub mod locale;
mod sys;

use core::ffi::c_uint;

pub use api::*;
pub use buf::{WideBuf, WideOut};
pub use errno::{errno, Errno};
pub use error::{Error, Result};
pub use file::OwnedFile;
pub use sys::{Native, Platform};
pub use widestring::{WideCStr, WideCString, WideChar};

/// The platform's path separator.
#[cfg(not(windows))]
pub const PATH_SEPARATOR: char = '/';
/// The platform's path separator.
#[cfg(windows)]
pub const PATH_SEPARATOR: char = '\\';

/// The longest path, in bytes, the OS primitives accept.
#[cfg(not(windows))]
#[allow(clippy::cast_sign_loss)]
pub const MAX_PATH: usize = libc::PATH_MAX as usize;
/// The longest path, in characters, the OS primitives accept.
#[cfg(windows)]
pub const MAX_PATH: usize = 260;

/// The UTF-8 code page identifier.
pub const CP_UTF8: c_uint = 65001;
