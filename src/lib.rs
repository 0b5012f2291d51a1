//! # rpager - An Interactive Terminal Pager
//!
//! A less-style pager over one or more sources with lazy line caching,
//! regex search and filtering powered by the ripgrep core libraries, and a
//! ratatui terminal frontend.
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`source`] - Named byte sources and the multi-source registry
//! - [`cache`] - Lazy line cache over an open stream
//! - [`text`] - Styled line model: ANSI parsing, tab expansion, column math
//! - [`navigate`] - View movement: wrap-aware paging, seeks, match jumps
//! - [`search`] - Pattern compilation, case policy, and history
//! - [`input`] - Key decoding, bindings, and the input state machine
//! - [`render`] - Frame composition and terminal painting
//! - [`app`] - Session dispatch and the event loop

pub mod app;
pub mod cache;
pub mod cancel;
pub mod error;
pub mod input;
pub mod navigate;
pub mod render;
pub mod search;
pub mod source;
pub mod text;
pub mod view;

pub use app::session::PagerSession;
pub use app::{AppConfig, Application};
pub use error::{PagerError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
