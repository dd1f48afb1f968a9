//! High-level file-system utilities: path helpers, existence checks,
//! durable (optionally atomic) file writes, transactional replace of files
//! and directories, copy/move/remove, search, size/hash/date information,
//! zip/tar archives and optional HTTP downloads.
//!
//! Every operation is a free function re-exported at the crate root;
//! behavior knobs live in small option structs (`WriteOptions`,
//! `ReadLinesOptions`, `UniqueNameOptions`, `DownloadOptions`).

pub mod fs_op;

pub use crate::fs_op::*;
