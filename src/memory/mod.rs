//! Memory model for the routine interpreter
//!
//! This module provides the core memory abstractions:
//! - [`value`]: Runtime value representation (numbers, strings, shared arrays
//!   and objects, function references)
//! - [`stack`]: Call stack with frames, block scopes and bindings
//!
//! There is no separate heap: arrays and objects are reference counted and
//! freed when the last binding referring to them goes away.

pub mod stack;
pub mod value;

pub use value::{JsObject, Value};
