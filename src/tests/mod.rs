pub mod common;
mod cors_and_metrics;
