//! URL handling module for Novel-Spider
//!
//! Chapter URLs are often written without a scheme, and next-chapter links
//! are usually site-relative. This module normalizes both and derives the
//! cache file name of a page.

mod normalize;

pub use normalize::{
    last_path_segment, page_url, resolve_link, site_root, split_scheme, strip_scheme, with_scheme,
};
