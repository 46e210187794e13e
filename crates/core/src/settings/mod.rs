pub mod preferences_model;
pub mod preferences_store;

pub use preferences_model::*;
pub use preferences_store::PreferencesStore;
