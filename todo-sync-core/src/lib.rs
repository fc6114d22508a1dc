pub mod errors;
pub mod models;
pub mod view;

pub use errors::*;
pub use models::*;
pub use view::*;
