pub mod glucose;
pub mod status;
