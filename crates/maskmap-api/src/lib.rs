pub mod client;
pub mod error;
pub mod types;

pub use client::StoreClient;
pub use error::FetchError;
pub use types::{StoreRecord, StoreResponse};
