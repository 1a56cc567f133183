//! The loaded policy and the handle used to swap it on reload.

mod handle;
mod store;

pub use handle::PolicyHandle;
pub use store::PolicyStore;
