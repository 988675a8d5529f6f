pub mod agenda;
pub mod commands;
pub mod components;
pub mod config;
pub mod error;
pub mod startup;
