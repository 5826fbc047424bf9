//! Integration tests for the output generation pipeline

mod end_to_end;
mod run_context;
mod support;
