//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types and 2D affine builders
//! - Arena collections
//! - Frame timing
//! - Logging setup

pub mod collections;
pub mod logging;
pub mod math;
pub mod time;
