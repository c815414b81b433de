//! Embassy async tasks

pub mod sink;

pub use sink::sink_task;
