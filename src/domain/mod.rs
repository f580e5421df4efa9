pub mod event;
pub mod types;
pub mod user;

pub use event::*;
pub use types::*;
pub use user::*;
