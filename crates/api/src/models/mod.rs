pub mod resource;
pub mod root;

pub use resource::*;
pub use root::*;
