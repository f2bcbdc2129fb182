mod handler;
mod model;

pub use handler::get_glucose;
pub use model::GlucoseView;
