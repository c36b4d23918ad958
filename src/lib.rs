pub mod classify;
pub mod config;
pub mod observation;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod stats;
pub mod window;
