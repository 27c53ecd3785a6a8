//! Neon line-field page background and copy-page-link toast.
//!
//! The drawing and scheduling logic is host-agnostic and shared by the
//! browser build (`web`, wasm32 only) and the headless `lineglow` binary.

pub mod animator;
pub mod clipboard;
pub mod toast;

#[cfg(target_arch = "wasm32")]
mod web;

pub use animator::{BackgroundAnimator, LineScene};
pub use clipboard::{Clipboard, ClipboardError};
pub use toast::{CopyLinkAction, CopyOutcome, Toast, ToastView};
