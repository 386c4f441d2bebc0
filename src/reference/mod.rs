// Reference module - configured target sounds and their persistence
//
// - profile: ReferenceProfile, FeedbackRules, lifecycle state transitions
// - store: ReferenceStore, one JSON document per profile with atomic writes

pub mod profile;
pub mod store;

pub use profile::{FeedbackRules, ProfileState, ReferenceProfile};
pub use store::ReferenceStore;
