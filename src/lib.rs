pub mod boot;
pub mod cli;
pub mod config;
pub mod env;
pub mod error;
pub mod gateway;
pub mod infra;
pub mod logging;
pub mod onboarding;
pub mod patch;
pub mod providers;
pub mod restore;
