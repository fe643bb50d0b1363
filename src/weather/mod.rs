//! Weather observations, indexing and grid coupling.

pub mod coupler;
pub mod index;
pub mod pivot;
pub mod types;

pub use coupler::WeatherCoupler;
pub use index::WeatherIndex;
pub use types::{Parameter, WeatherObservation, WeatherRecord, WeatherSample, WindowAverage};
