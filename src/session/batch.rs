use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use futures::{future::BoxFuture, FutureExt};
use log::{info, warn};

use crate::{
    generation::{EditRequest, EditResult, ImageGenerator, ServiceError},
    ImageRef,
};

pub type ItemOutcome = Result<EditResult, ServiceError>;

/// Outcome of every item of a batch, in submission order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    items: Vec<(ImageRef, ItemOutcome)>,
}

impl BatchOutcome {
    pub fn new(items: Vec<(ImageRef, ItemOutcome)>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[(ImageRef, ItemOutcome)] {
        &self.items
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn successes(&self) -> usize {
        self.items.iter().filter(|(_, r)| r.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&ImageRef, &ServiceError)> {
        self.items
            .iter()
            .filter_map(|(source, r)| r.as_ref().err().map(|e| (source, e)))
    }

    pub fn results(&self) -> impl Iterator<Item = &EditResult> {
        self.items.iter().filter_map(|(_, r)| r.as_ref().ok())
    }

    pub fn summary(&self) -> String {
        format!(
            "{} of {} images processed successfully",
            self.successes(),
            self.total()
        )
    }
}

/// Applies `template` to every source, one after the other. A failed item is
/// recorded and the loop moves on, nothing is retried.
pub fn run_batch(
    generator: Arc<dyn ImageGenerator + Send + Sync>,
    sources: Vec<ImageRef>,
    template: EditRequest,
    attempted: Arc<AtomicUsize>,
) -> BoxFuture<'static, BatchOutcome> {
    async move {
        let total = sources.len();
        let mut items = Vec::with_capacity(total);
        for (i, source) in sources.into_iter().enumerate() {
            let request = template.clone().with_source(source.clone());
            let outcome = generator.generate(&request).await;
            match &outcome {
                Ok(_) => info!("Batch item {}/{total} done", i + 1),
                Err(e) => warn!("Batch item {}/{total} ({source}) failed: {e}", i + 1),
            }
            items.push((source, outcome));
            attempted.fetch_add(1, Ordering::Relaxed);
        }
        BatchOutcome::new(items)
    }
    .boxed()
}
