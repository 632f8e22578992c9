//! Files Domain
//!
//! Upload gate for product images: only files whose extension is on the
//! allow-list get through, and the response echoes the original file name.
//! Storing the bytes is left to whatever fronts this service.
//!
//! ```rust,no_run
//! use domain_files::{handlers, UploadConfig};
//!
//! let router = axum::Router::new().nest("/files", handlers::router(UploadConfig::default()));
//! ```

pub mod error;
pub mod filter;
pub mod handlers;

pub use error::{FileError, NOT_AN_IMAGE};
pub use filter::{FileFilter, UploadConfig};
pub use handlers::{ApiDoc, UploadedFile};
