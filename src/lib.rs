//! Client-side behaviour for the link shortener pages.
//!
//! The crate compiles to a WebAssembly module that the server-rendered pages
//! load once. On `DOMContentLoaded` it wires up the passive behaviours
//! (auto-dismissing alerts, URL validation, tooltips, keyboard shortcuts and
//! the entrance animation) and exports the handful of functions the templates
//! call from inline handlers, such as `copyToClipboard` and `togglePassword`.
//!
//! All behaviour lives in [`controllers`] and is written against the [`Page`]
//! trait; `web` provides the browser implementation and `testing` an in-memory
//! one.

pub mod config;
pub mod controllers;
pub mod format;
pub mod logging;
pub mod page;
pub mod startup;
pub mod theme;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[cfg(feature = "web")]
pub mod web;

pub use config::UiConfig;
pub use page::{Page, PageError, ShareData};
pub use startup::{StartupReport, Ui};
