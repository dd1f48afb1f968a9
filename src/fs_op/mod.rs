pub mod archive;
pub mod convert;
pub mod copy;
pub mod create;
pub mod error;
pub mod helpers;
pub mod http;
pub mod info;
pub mod io;
pub mod json;
pub mod metadata;
pub mod mv;
pub mod path;
pub mod remove;
pub mod replace;
pub mod search;
pub mod stat;
pub mod unique;

pub use archive::*;
pub use convert::*;
pub use copy::{copy_dir, copy_dir_content, copy_file};
pub use create::*;
pub use error::{FsOpError, Result};
pub use helpers::{atomic_write, rename_or_copy, ATOMIC_TEMP_PREFIX};
pub use http::{
    download_file, read_file_from_url, read_file_from_url_with, DownloadOptions, RequestOptions,
};
pub use info::*;
pub use io::*;
pub use metadata::{get_permissions, set_permissions};
pub use mv::*;
pub use path::*;
pub use remove::*;
pub use replace::*;
pub use search::*;
pub use stat::*;
pub use unique::*;
