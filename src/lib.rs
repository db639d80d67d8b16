pub mod cli;
pub mod config;
pub mod consts;
pub mod engine;
pub mod generator;
pub mod server;
pub mod tools;
