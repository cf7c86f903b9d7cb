//! Shared application state for the HTTP surface.

use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::location::{HttpMapsSearchApi, LocationService, MapsSearchClient};
use crate::timezone::{
    GeoTimezoneService, HttpTimezoneApi, RetrievalPipeline, TimeConversionService,
};

pub struct AppState {
    pub pipeline: RetrievalPipeline,
    pub conversion: TimeConversionService,
}

impl AppState {
    /// Wires the concrete providers into the pipeline.
    pub fn from_config(config: &Config) -> Result<Self> {
        let search_api = HttpMapsSearchApi::new(&config.maps_search_url, &config.maps_api_key)?;
        let locations = LocationService::new(Arc::new(MapsSearchClient::new(Arc::new(search_api))));
        let lookup = HttpTimezoneApi::new(&config.timezone_api_url)?;
        let retrieval = GeoTimezoneService::new(locations, Arc::new(lookup));

        Ok(Self {
            pipeline: RetrievalPipeline::new(Arc::new(retrieval)),
            conversion: TimeConversionService::new(),
        })
    }
}
