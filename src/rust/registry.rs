use log::info;

use crate::classifier::SentimentClassifier;
use crate::evaluation::EvaluationError;

/// The ordered set of classifiers taking part in a run, keyed by name.
///
/// Classifiers are built and configured by the caller before they are
/// registered; the registry only owns them.
#[derive(Default)]
pub struct Registry {
    adapters: Vec<Box<dyn SentimentClassifier>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a classifier. Its name must not already be taken.
    pub fn register<C>(&mut self, adapter: C) -> Result<(), EvaluationError>
    where
        C: SentimentClassifier + 'static,
    {
        self.register_boxed(Box::new(adapter))
    }

    pub fn register_boxed(
        &mut self,
        adapter: Box<dyn SentimentClassifier>,
    ) -> Result<(), EvaluationError> {
        if self.get(adapter.name()).is_some() {
            return Err(EvaluationError::DuplicateAdapter(adapter.name().to_string()));
        }
        info!("Registered classifier '{}'", adapter.name());
        self.adapters.push(adapter);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn SentimentClassifier> {
        self.iter().find(|adapter| adapter.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn SentimentClassifier> {
        self.adapters.iter().map(|adapter| adapter.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.adapters.iter().map(|adapter| adapter.name())
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
