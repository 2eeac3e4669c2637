use std::{io, sync::Arc};

use futures::{future::BoxFuture, FutureExt};
use itertools::Itertools;

use crate::ImageRef;

pub mod in_memory;

pub use in_memory::InMemoryCatalog;

#[derive(PartialEq, Clone, Eq, PartialOrd, Ord, Debug, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ListingId(Arc<str>);

impl ListingId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

/// Source of listings the user marked as favourite.
pub trait Catalog {
    fn favorites(&self) -> BoxFuture<'static, io::Result<Vec<Listing>>>;

    /// Every favourited image as `(listing, image)`, in catalog order.
    /// An image shared by two listings is offered once, under the first.
    fn edit_sources(&self) -> BoxFuture<'static, io::Result<Vec<(ListingId, ImageRef)>>> {
        self.favorites()
            .map(|listings: io::Result<Vec<Listing>>| -> io::Result<Vec<(ListingId, ImageRef)>> {
                Ok(listings?
                    .into_iter()
                    .flat_map(|listing| {
                        let id = listing.id;
                        listing
                            .images
                            .into_iter()
                            .filter(|image| !image.is_empty())
                            .map(move |image| (id.clone(), image))
                    })
                    .unique_by(|(_, image)| image.clone())
                    .collect())
            })
            .boxed()
    }
}
