pub mod analysis;
pub mod assets;
pub mod config;
pub mod errors;
pub mod export;
pub mod instructions;
pub mod web;
