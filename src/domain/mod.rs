pub mod user;
pub mod order;
pub mod status;

pub use user::*;
pub use order::*;
pub use status::*;
