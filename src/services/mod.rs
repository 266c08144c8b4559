pub mod batch;
pub mod client;
pub mod encoding;
pub mod history;
pub mod task;
