mod content_fetcher;
mod throttle;

pub use content_fetcher::{ContentFetcher, FetchError, FetchedPage, PageFetcher};
pub use throttle::{FixedDelay, Throttle};
