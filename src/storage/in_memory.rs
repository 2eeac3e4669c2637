use std::{
    io,
    sync::{Arc, Mutex},
};

use futures::{future::BoxFuture, FutureExt};

use super::{Catalog, Listing, ListingId};

#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    listings: Arc<Mutex<Vec<Listing>>>,
}

impl InMemoryCatalog {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self {
            listings: Arc::new(Mutex::new(listings)),
        }
    }

    pub fn insert(&self, listing: Listing) -> io::Result<()> {
        let mut listings = self.lock()?;
        match listings.iter_mut().find(|l| l.id == listing.id) {
            Some(existing) => *existing = listing,
            None => listings.push(listing),
        }
        Ok(())
    }

    pub fn remove(&self, id: &ListingId) -> io::Result<Option<Listing>> {
        let mut listings = self.lock()?;
        Ok(listings
            .iter()
            .position(|l| &l.id == id)
            .map(|pos| listings.remove(pos)))
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, Vec<Listing>>> {
        self.listings
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "Catalog lock poisoned"))
    }
}

impl Catalog for InMemoryCatalog {
    fn favorites(&self) -> BoxFuture<'static, io::Result<Vec<Listing>>> {
        let listings = self.lock().map(|l| l.clone());
        async move { listings }.boxed()
    }
}
