//! File storage backends.

mod avatar_store;

pub use avatar_store::LocalAvatarStore;
