pub mod manager;
pub mod traits;
pub mod types;

pub use manager::ProviderManager;
pub use traits::CatalogProvider;
pub use types::ProviderKind;
