//! Client for the OpenRouter chat completions API

mod client;

pub use client::*;
