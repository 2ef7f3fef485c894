//! Lazy, cached, retrying component references.
//!
//! UI regions register with the coordinator whenever their own setup finishes,
//! so code that needs a region may run before the region exists. A
//! [`ComponentReference`] hides that race: `get()` keeps asking a resolver
//! until it produces a value, the retry budget runs out, or the timeout fires.
//!
//! # Example
//!
//! ```
//! use layout_core::reference::{ComponentReference, ReferenceConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let reference = ComponentReference::new("answer", || Some(42), ReferenceConfig::default());
//! assert_eq!(reference.get().await, Some(42));
//! assert!(reference.is_available());
//! # }
//! ```

mod component_ref;

pub use component_ref::{ComponentReference, ReferenceConfig};
