//! This module contains the configuration a scan runs under: the user's
//! settings snapshot and the scanner's own tunables.

pub mod options;
pub mod settings;
