//! Remote item catalog
//!
//! `CatalogApi` is the seam between the import algorithm and the catalog's
//! HTTP resource API. `HttpCatalog` talks to a live Omeka S instance; tests
//! substitute an in-memory implementation.

mod http;
mod payload;

pub use http::HttpCatalog;
pub use payload::{
    ClassAssignment, CreatedItem, PropertyBag, ResourceClass, ResourceClassPage, ValueDescriptor,
};

use crate::errors::Result;

/// The three catalog operations the importer needs
///
/// Implementations authenticate every call themselves.
#[allow(async_fn_in_trait)]
pub trait CatalogApi {
    /// List resource classes, asking for at most `per_page` per page
    async fn list_resource_classes(&self, per_page: u32) -> Result<ResourceClassPage>;

    /// Create a bare item and return its remote id
    async fn create_item(&self, assignment: &ClassAssignment) -> Result<u64>;

    /// Partially update item `id` with `properties`
    async fn patch_item(&self, id: u64, properties: &PropertyBag) -> Result<()>;
}
