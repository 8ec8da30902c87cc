//! # Wayfarer Core
//!
//! Core data structures for the Wayfarer retrieval layer.
//!
//! - [`Vector`] - Dense embedding vector
//! - [`Point`] - An embedded document: id, vector, text and metadata payload
//! - [`Collection`] - Append-only, uniquely keyed set of points with similarity search
//! - [`PayloadFilter`] - Exact-match metadata predicate applied before ranking
//!
//! ## Example
//!
//! ```rust
//! use wayfarer_core::{Collection, CollectionConfig, Distance, Payload, Point, PointId, Vector};
//!
//! let collection = Collection::new(CollectionConfig {
//!     name: "hotels".to_string(),
//!     vector_dim: 3,
//!     distance: Distance::Cosine,
//! });
//!
//! let point = Point::new(
//!     PointId::random(),
//!     Vector::new(vec![1.0, 0.0, 0.0]),
//!     "Hotel: The Savoy",
//!     Payload::new(),
//! );
//! collection.insert(point).unwrap();
//!
//! let results = collection.search(&Vector::new(vec![1.0, 0.0, 0.0]), 5, None);
//! assert_eq!(results.len(), 1);
//! ```

pub mod collection;
pub mod error;
pub mod filter;
pub mod point;
pub mod vector;

pub use collection::{Collection, CollectionConfig, Distance};
pub use error::{Error, Result};
pub use filter::{Filter, FilterCondition, PayloadFilter};
pub use point::{Payload, Point, PointId};
pub use vector::Vector;
