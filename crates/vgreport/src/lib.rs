//! vgreport library - exposes the CLI pieces for integration tests

pub mod cli;
pub mod html;
pub mod logging;
pub mod run;
pub mod site;
pub mod summary;
