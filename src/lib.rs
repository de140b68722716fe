//! Chat with an assistant that manages invoices through function calling.
//!
//! Two halves: a stateless relay that holds the model provider credential,
//! and a chat client that drives the function-calling loop against a local
//! invoice store.

pub mod app;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod display;
pub mod input;
pub mod operations;
pub mod providers;
pub mod relay;
pub mod store;
