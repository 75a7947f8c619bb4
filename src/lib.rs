// src/lib.rs

//! EB command portal client library

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
