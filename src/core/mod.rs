pub mod backend;
pub mod classifier;
pub mod config;
pub mod guard;
pub mod pipeline;
pub mod prompt;
pub mod refine;
pub mod retry;
pub mod title;
