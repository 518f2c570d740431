//! This module contains functionality shared by the rest of the crate:
//! issues, compilation, phrase matching, host identity and loading.

pub mod compilation;
pub mod host;
pub mod pattern;
pub mod retrieve;
pub mod validation;
