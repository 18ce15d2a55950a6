pub mod chat;
pub mod cli;
pub mod core;
pub mod credential;
pub mod openrouter;
pub mod view;
