// Application layer - Use case interactors

pub mod container;
pub mod conversion_interactor;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use conversion_interactor::ConversionInteractor;
