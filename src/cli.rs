//! CLI domain: parse, route, output, and presentation only.
//! Pipeline orchestration lives in `pipeline`; the route wires concrete collaborators.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::Cli;
pub use presentation::{format_batch_report, format_frame_list};
pub use route::RunContext;
