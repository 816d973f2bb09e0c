pub mod base;
pub mod factory;

pub mod aggregator;
pub mod film_db;
pub mod review_site;

pub use aggregator::AggregatorAdapter;
pub use film_db::FilmDbAdapter;
pub use review_site::ReviewSiteAdapter;
