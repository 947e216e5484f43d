//! Value objects - immutable types defined by their attributes

mod geo_location;
mod page;

pub use geo_location::{BoundingBox, GeoLocation};
pub use page::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageRequest, page_count};
