mod controller;
mod loop_worker;

pub use controller::{SessionController, SessionInfo};
pub use loop_worker::{next_delay, poll_loop, Pacing};
