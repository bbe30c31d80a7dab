//! Application Layer
//!
//! Use cases that orchestrate the domain ports.

mod enrichment_engine;

pub use enrichment_engine::{
    candidate_ip, remote_addr, strip_port, EngineState, EnrichmentEngine, CITY_HEADER,
    COUNTRY_HEADER, REAL_IP_HEADER, REGION_HEADER,
};
