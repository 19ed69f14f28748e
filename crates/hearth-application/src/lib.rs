//! Application layer for Hearth.
//!
//! Stores and the facade that coordinate the core domain types with the
//! storage backends: the dual store adapter, the session and preference
//! stores, the scroll-restore coordinator and the persistence manager.

pub mod dual_store;
pub mod persistence_manager;
pub mod preference_store;
pub mod route_guard;
pub mod scroll_restore;
pub mod session_store;

pub use dual_store::{BackendSlot, DualStore};
pub use persistence_manager::{BootState, PersistenceManager};
pub use preference_store::PreferenceStore;
pub use route_guard::{Navigation, RouteGuard};
pub use scroll_restore::{ScrollRestore, Viewport};
pub use session_store::SessionStore;
