pub mod config;
pub mod output;
pub mod responses;
pub mod scoring;
