//! Output generation for the digest.
//!
//! # Submodules
//!
//! - [`html`]: Groups articles by category and renders the HTML mail body

pub mod html;
