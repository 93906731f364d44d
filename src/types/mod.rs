pub mod host;
pub mod value;

pub use host::to_value;
pub use value::{Map, Value};
