//! Timezone subsystem: retrieval pipeline and time conversion.

pub mod conversion;
pub mod models;
pub mod pipeline;
pub mod retrieval;

pub use conversion::TimeConversionService;
pub use models::{
    ErrorDetail, TimeConversionRequest, TimeConversionResponse, TimezoneRequest, TimezoneResponse,
};
pub use pipeline::RetrievalPipeline;
pub use retrieval::{GeoTimezoneService, HttpTimezoneApi, TimezoneLookup, TimezoneRetrieval};
