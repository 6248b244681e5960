//! Stacked dialog system
//!
//! This module provides the state model for a set of named dialogs that can be
//! open at the same time, and the layout derivation that turns the open set
//! into a visual stack.
//!
//! Components receive a [`DialogContext`] explicitly from the [`DialogProvider`]
//! that owns the registry, so several independent stacks can coexist.

pub mod context;
pub mod controls;
pub mod layout;
pub mod registry;
pub mod types;

pub use context::{DialogContext, DialogProvider};
pub use controls::{ButtonKind, DialogButton, DialogTrigger};
pub use layout::{StackConfig, StackEntry, StackLayout, StackOffsets, StackTransform, Transition};
pub use registry::DialogRegistry;
pub use types::*;
