pub mod dispatch;
pub mod error;
pub mod logging;
pub mod pending;
pub mod service;
pub mod session;
pub mod zenoh_planner;
