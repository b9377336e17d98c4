pub mod batch;
pub mod checkpoint;
pub mod collect;
pub mod correlate;
pub mod prompt;
pub mod session;
pub mod sources;
pub mod stats;
