pub mod gemini;
pub mod request;
pub mod style;

pub use gemini::*;
pub use request::*;
pub use style::*;
