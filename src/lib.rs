pub mod cli;
pub mod collab;
pub mod config;
pub mod manifest;
pub mod models;
pub mod screens;
pub mod shell;
pub mod tui;
