mod config;
pub mod memory;
mod store;

#[cfg(feature = "fs-store")]
pub mod fs;

pub use self::config::StoreConfig;
pub use self::memory::MemoryStore;
pub use self::store::{one_off_entry_id, Error, Property, Result, Store, StoreBuilder, UserProfile};
#[cfg(feature = "fs-store")]
pub use self::fs::{FsConfig, FsStore};
