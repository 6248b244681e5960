//! Stacked dialogs for the terminal
//!
//! A registry of named dialogs, a layout engine that ranks the open ones into
//! a visual stack, and the terminal pieces that draw and animate it.

pub mod animation;
pub mod cli;
pub mod config;
pub mod dialog;
pub mod docs;
pub mod tui;
