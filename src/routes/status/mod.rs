mod handler;

pub use handler::{StatusView, get_status, health};
