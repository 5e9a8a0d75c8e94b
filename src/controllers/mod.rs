//! Page behaviours, one module per concern.
//!
//! - [`busy`]: disable a button and show a spinner while work is in flight
//! - [`clipboard`]: copy text and flash a "Copied!" confirmation on the trigger
//! - [`notifications`]: fade out and remove transient alerts
//! - [`share`]: native share sheet with clipboard fallback, in-memory downloads
//! - [`shortcuts`]: Ctrl/Cmd+K focus and Escape-to-close
//! - [`tooltip`]: the single hover tooltip overlay
//! - [`validation`]: live URL input validation
//! - [`visibility`]: password reveal toggle and smooth scrolling

pub mod busy;
pub mod clipboard;
pub mod notifications;
pub mod share;
pub mod shortcuts;
pub mod tooltip;
pub mod validation;
pub mod visibility;
