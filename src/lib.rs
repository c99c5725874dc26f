pub mod aggregation;
pub mod io;
pub mod matching;
pub mod models;
pub mod partition;
pub mod pipeline;
pub mod utils;

pub use pipeline::run_dedupe;
