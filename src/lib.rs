#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate log;
#[macro_use]
extern crate lazy_static;
extern crate htmlescape;
extern crate regex;
extern crate ron;
extern crate serde;
extern crate unicode_segmentation;
extern crate url;

pub mod common;
pub mod input;
pub mod output;
pub mod scan;
pub mod settings;
