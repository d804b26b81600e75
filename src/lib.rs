pub mod config;
pub mod intro;
pub mod logging;
pub mod risk;
pub mod styles;
