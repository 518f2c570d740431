//! This module contains the document the scanner works on: the `Document`
//! capability, its in-memory implementation and box geometry.

pub mod document;
pub mod geometry;
pub mod memory;
