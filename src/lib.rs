// src/lib.rs

pub mod application;
pub mod blockchain;
pub mod cli;
pub mod core;
pub mod tools;
pub mod utils;
