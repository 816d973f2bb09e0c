use std::sync::Arc;

use crate::apis::{AggregatorAdapter, FilmDbAdapter, ReviewSiteAdapter};
use crate::app::ports::PageFetcher;
use crate::types::{Platform, PlatformAdapter};

/// Builds the adapter for one platform
pub fn create_adapter(platform: Platform, fetcher: Arc<dyn PageFetcher>) -> Arc<dyn PlatformAdapter> {
    match platform {
        Platform::Aggregator => Arc::new(AggregatorAdapter::new(fetcher)),
        Platform::FilmDb => Arc::new(FilmDbAdapter::new(fetcher)),
        Platform::ReviewSite => Arc::new(ReviewSiteAdapter::new(fetcher)),
    }
}

/// One adapter per supported platform, all sharing `fetcher`
pub fn create_all_adapters(fetcher: Arc<dyn PageFetcher>) -> Vec<Arc<dyn PlatformAdapter>> {
    Platform::ALL
        .into_iter()
        .map(|platform| create_adapter(platform, fetcher.clone()))
        .collect()
}
