pub mod event;
pub mod progress;
pub mod session;
pub mod store;
