pub mod alias;
pub use alias::{AliasResolver, AliasStoreCapability};

pub mod cache;
pub use cache::{Clock, SystemClock, TtlCache};

pub mod localization;
pub use localization::{LocalizationFiller, Translator};

pub mod merge;
pub use merge::merge_catalog_results;

pub mod ranking;
pub use ranking::{Ranker, rank_catalog_results};

pub mod search;
pub use search::{CatalogSearchService, SearchError, SearchRequest, SearchResponse};

pub mod catalog_service;
pub mod catalog_service_impl;
pub use catalog_service::{CatalogError, CatalogService};
pub use catalog_service_impl::SeaOrmCatalogService;

pub mod tracking_service;
pub mod tracking_service_impl;
pub use tracking_service::{TrackingError, TrackingService};
pub use tracking_service_impl::SeaOrmTrackingService;
