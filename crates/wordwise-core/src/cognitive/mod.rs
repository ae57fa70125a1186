//! Memory model and review scheduling.
//!
//! [`DecayModel`] and [`UpdatePolicy`] are pure math over a memory state,
//! [`DueSelector`] picks what to study next, and [`ReviewScheduler`] ties
//! them to the SQLite-backed [`ReviewStore`].

mod decay;
mod scheduler;
mod selector;
mod store;
mod update;

pub use decay::DecayModel;
pub use scheduler::ReviewScheduler;
pub use selector::{CandidatePool, DueSelector, Selection, SelectionReason, SelectionSource};
pub use store::ReviewStore;
pub use update::{MemoryUpdate, UpdatePolicy};
