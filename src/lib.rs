//! site-l10n
//!
//! Locale switching, geo-based locale detection and content binding for
//! static marketing sites.

pub mod cli;
pub mod config;
pub mod dom;
pub mod l10n;
pub mod types;
pub mod ui;

#[cfg(test)]
mod test_utils;

pub use l10n::LanguageSwitcher;
