mod common;
mod distribution;
mod scoring;
