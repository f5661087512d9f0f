pub mod decision;
pub mod lookup;
pub mod scoring;
pub mod store;

pub use decision::DecisionEngine;
pub use lookup::RegistryLookup;
pub use scoring::FieldMatcher;
pub use store::RegistryStore;
