//! Typed (de)serialization of cache values.
//!
//! Values are stored as JSON bytes. The generic helpers keep the value shape
//! attached to a Rust type: a cached blob that no longer matches the expected
//! type fails to deserialize and is treated as a miss by the read path,
//! instead of being served with the wrong shape.

use serde::{de::DeserializeOwned, Serialize};

use super::{CacheError, Result};

/// Serializes a value to JSON bytes for cache storage.
pub fn to_cache_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))
}

/// Deserializes JSON bytes back into a typed value.
pub fn from_cache_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| CacheError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commerce::{NewProduct, NewUser, Product, User};

    #[test]
    fn test_roundtrip_user() {
        let user = User::new(
            1,
            NewUser {
                name: "John".to_string(),
                email: "john@example.com".to_string(),
            },
        );

        let bytes = to_cache_bytes(&user).expect("serialize should succeed");
        let back: User = from_cache_bytes(&bytes).expect("deserialize should succeed");

        assert_eq!(user, back);
    }

    #[test]
    fn test_roundtrip_product_vec() {
        let products = vec![Product::new(
            7,
            NewProduct {
                name: "Laptop".to_string(),
                description: None,
                price: 1500.0,
                stock: 2,
                category_id: Some(1),
            },
        )];

        let bytes = to_cache_bytes(&products).expect("serialize should succeed");
        let back: Vec<Product> = from_cache_bytes(&bytes).expect("deserialize should succeed");

        assert_eq!(products, back);
    }

    #[test]
    fn test_malformed_bytes_fail() {
        let result: Result<User> = from_cache_bytes(b"not valid json");
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }

    #[test]
    fn test_shape_mismatch_fails() {
        // A product blob must not deserialize as a user.
        let product = Product::new(
            1,
            NewProduct {
                name: "Laptop".to_string(),
                description: None,
                price: 1500.0,
                stock: 0,
                category_id: None,
            },
        );
        let bytes = to_cache_bytes(&product).unwrap();

        let result: Result<User> = from_cache_bytes(&bytes);
        assert!(result.is_err());
    }
}
