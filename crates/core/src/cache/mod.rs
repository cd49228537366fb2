mod error;
mod keys;
mod patterns;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{
    derive_key, product_key, products_all_key, products_category_key, products_list_key,
    user_key, users_all_key, LIVENESS_PROBE_KEY,
};
pub use patterns::pattern_matches;
pub use serialization::{from_cache_bytes, to_cache_bytes};
pub use traits::Cache;
