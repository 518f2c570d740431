//! This module contains everything the scanner produces: annotations on the
//! document, match reports and rendered HTML.

pub mod annotation;
pub mod render;
pub mod report;
