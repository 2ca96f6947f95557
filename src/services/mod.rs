pub mod batch;
pub mod diff;
pub mod environment;
pub mod response;
pub mod store;
pub mod workspace;
