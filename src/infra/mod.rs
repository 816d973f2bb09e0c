pub mod catalog_file;
pub mod http_client;

pub use catalog_file::JsonFileCatalog;
pub use http_client::ReqwestFetcher;
