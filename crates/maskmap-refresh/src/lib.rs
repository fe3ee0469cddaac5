pub mod controller;
pub mod fetcher;
pub mod policy;
pub mod projector;
pub mod session;

pub use controller::{FetchPlan, RefreshConfig, RefreshController, RefreshState};
pub use fetcher::StoreFetcher;
pub use projector::{project, PinRecord};
pub use session::{MapEvent, MapSession, SessionHandle};
