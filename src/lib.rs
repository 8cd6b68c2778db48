pub(crate) mod process;

pub mod store;
pub use store::*;

pub mod domain;
pub use domain::*;

pub mod session;
pub use session::{Session, UserSelection};
