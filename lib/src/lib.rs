#![doc = svgbobdoc::transform!(
//! Renders a directory of markdown and HTML into a static web site.
//!
//! # Overview
//!
//! A site is generated from a source directory in two phases: the whole
//! source tree is first read into memory, then written out to an output
//! directory that mirrors it one to one.
//!
//! ```svgbob
//!  +------------+      +------+      +-----------+
//!  | source dir |----->| Tree |----->| Generator |
//!  +------------+      +------+      +-----+-----+
//!                                          |
//!          +-------------------------------+------------------+
//!          |                               |                  |
//!     +----+-----+                  +------+------+     +-----+----+
//!     | md page  |                  |  html page  |     |   file   |
//!     +----+-----+                  +------+------+     +-----+----+
//!          |                               |                  |
//!   +------+-------+                       |                  |
//!   | _template    |                       |                  |
//!   | (nearest     |                       |                  |
//!   |  ancestor)   |                       |                  |
//!   +------+-------+                       |                  |
//!          |         +----------+          |                  |
//!          +-------->| Renderer |<---------+                  |
//!                    +----+-----+                             |
//!                         |                                   |
//!                         v                                   v
//!                   +-------------+                    +-------------+
//!                   | out/*.html  |                    |  out/*.*    |
//!                   +-------------+                    +-------------+
//! ```
//!
//! Every entry of the source directory is one of:
//!
//!   * **Directories**, mirrored in the output as needed.
//!
//!   * **Markdown pages** (`.md`). The first line is the page's title, the
//!     second line is dropped, and the rest is its content. A markdown page is
//!     rendered through the nearest `_template.html` found in its directory or
//!     any ancestor directory up to the source root. The template sees `Title`,
//!     `Content`, `URL`, `Path` and `Filename`; `Content` is raw markdown, and
//!     templates convert it with `markdown(Content)` or `Content|markdown`.
//!
//!   * **HTML pages** (`.html`), which are their own template.
//!
//!   * **Files**, anything else, copied byte for byte.
//!
//! Entries whose name starts with `_` are never part of the site. They hold
//! layout templates and partials, which HTML pages and templates pull in with
//! `{{include <path>}}`, resolved relative to the including file.
//!
//! Generation is all or nothing: the first error of any kind stops the run.
)]

#[macro_use]
pub mod error;
pub mod config;
pub mod tree;
pub mod include;
pub mod layout;
pub mod markdown;
pub mod render;
pub mod output;

pub use error::{Error, Result};
pub use config::{Config, CONFIG_FILE};
pub use layout::TEMPLATE_FILE;
pub use output::{Generator, Summary};

/// Reads `config.src` and writes the rendered site to `config.out`.
pub fn generate(config: &Config) -> Result<Summary> {
    Generator::new(config.clone())?.generate()
}
