//! Partner agency directory, caching, and weighted recommendation sampling.

mod cache;
mod directory;
mod domain;
mod sampler;

pub use cache::{Clock, DirectoryCache, SystemClock};
pub use directory::{
    normalize_directory, parse_directory, DirectoryError, DirectorySource, FileDirectorySource,
    HttpDirectorySource, StaticDirectorySource,
};
pub use domain::{AgencyRecord, RawAgency, Recommendation, Weighted};
pub use sampler::sample_unique;
