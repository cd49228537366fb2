//! Cache key derivation.
//!
//! Every cached subject maps to a `prefix:part:part` string. The recognized
//! subjects are:
//!
//! - `user:<id>` / `users:all`
//! - `product:<id>` / `products:all` / `products:category:<categoryId>`
//!
//! Parts are joined with `:` without escaping, so a part that itself contains
//! the delimiter can collide with a differently-structured key. The services
//! only interpolate numeric ids, which keeps the recognized subjects
//! collision-free; callers adding new subjects must not embed free-form
//! strings (such as slugs) as parts.

/// Reserved key used by the liveness probe; written with a short TTL and
/// never read by the entity services.
pub const LIVENESS_PROBE_KEY: &str = "probe:liveness";

/// Joins a prefix and ordered parts into a cache key.
///
/// # Examples
///
/// ```
/// use storefront_core::cache::derive_key;
///
/// assert_eq!(derive_key("product", &["7"]), "product:7");
/// assert_eq!(derive_key("products", &["category:3"]), "products:category:3");
/// ```
pub fn derive_key(prefix: &str, parts: &[&str]) -> String {
    let mut key = String::from(prefix);
    for part in parts {
        key.push(':');
        key.push_str(part);
    }
    key
}

/// Returns the cache key for a single user.
pub fn user_key(id: i64) -> String {
    derive_key("user", &[&id.to_string()])
}

/// Returns the cache key for the full user listing.
pub fn users_all_key() -> String {
    derive_key("users", &["all"])
}

/// Returns the cache key for a single product.
pub fn product_key(id: i64) -> String {
    derive_key("product", &[&id.to_string()])
}

/// Returns the cache key for the unfiltered product listing.
pub fn products_all_key() -> String {
    derive_key("products", &["all"])
}

/// Returns the cache key for the product listing of one category.
pub fn products_category_key(category_id: i64) -> String {
    derive_key("products", &["category", &category_id.to_string()])
}

/// Returns the cache key for a product listing, filtered or not.
pub fn products_list_key(category_id: Option<i64>) -> String {
    match category_id {
        Some(id) => products_category_key(id),
        None => products_all_key(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_joins_with_delimiter() {
        assert_eq!(derive_key("product", &["7"]), "product:7");
        assert_eq!(derive_key("users", &["all"]), "users:all");
        assert_eq!(derive_key("a", &["b", "c", "d"]), "a:b:c:d");
    }

    #[test]
    fn test_derive_key_is_deterministic() {
        assert_eq!(derive_key("products", &["category", "3"]), derive_key("products", &["category", "3"]));
    }

    #[test]
    fn test_derive_key_does_not_escape_delimiter_in_parts() {
        // Documented sharp edge: a part containing ':' collides with the
        // equivalent multi-part key.
        assert_eq!(derive_key("products", &["category:3"]), "products:category:3");
        assert_eq!(
            derive_key("products", &["category:3"]),
            derive_key("products", &["category", "3"])
        );
    }

    #[test]
    fn test_user_keys() {
        assert_eq!(user_key(42), "user:42");
        assert_eq!(users_all_key(), "users:all");
    }

    #[test]
    fn test_product_keys() {
        assert_eq!(product_key(7), "product:7");
        assert_eq!(products_all_key(), "products:all");
        assert_eq!(products_category_key(3), "products:category:3");
    }

    #[test]
    fn test_products_list_key_dispatch() {
        assert_eq!(products_list_key(None), "products:all");
        assert_eq!(products_list_key(Some(3)), "products:category:3");
    }

    #[test]
    fn test_recognized_subjects_do_not_collide() {
        let keys = [
            user_key(1),
            users_all_key(),
            product_key(1),
            products_all_key(),
            products_category_key(1),
            LIVENESS_PROBE_KEY.to_string(),
        ];
        for (i, a) in keys.iter().enumerate() {
            for b in keys.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
