pub mod checks;
pub mod discovery;
pub mod errors;
pub mod logging;
pub mod properties;
pub mod qa_config;
pub mod review;
pub mod select;
pub mod ui;
