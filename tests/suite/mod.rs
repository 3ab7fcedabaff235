//! Integration test modules

mod browse;
mod render;
