pub mod common;
pub mod config_tests;
pub mod session_tests;
