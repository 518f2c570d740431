//! This module contains the scanning pipeline: choosing what to hide, the
//! mutation debouncer and the controller that ties them together.

pub mod debounce;
pub mod scanner;
pub mod selector;
