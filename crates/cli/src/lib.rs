pub mod app;
pub mod bot;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod handler;
pub mod logging;
pub mod output;
pub mod password;
pub mod users;
