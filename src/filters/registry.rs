use super::FilterDescriptor;
use crate::loader::LoadOutcome;
use log::debug;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Named filters available to the session. Lookups of unknown names return
/// `None`; they are never an error.
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    filters: BTreeMap<String, FilterDescriptor>,
}

impl FilterRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a filter
    pub fn insert(&mut self, name: impl Into<String>, descriptor: FilterDescriptor) {
        self.filters.insert(name.into(), descriptor);
    }

    /// Look up a filter by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FilterDescriptor> {
        self.filters.get(name)
    }

    /// Whether a filter with this name is configured
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Filter names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    /// Number of configured filters
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether no filters are configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Number of filters whose image is loaded
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.filters.values().filter(|f| f.is_bound()).count()
    }

    /// `(name, image path)` pairs to hand to the loader
    #[must_use]
    pub fn load_requests(&self) -> Vec<(String, PathBuf)> {
        self.filters
            .iter()
            .map(|(name, descriptor)| (name.clone(), descriptor.image_path.clone()))
            .collect()
    }

    /// Bind the images of successful loads. Failed outcomes leave their
    /// descriptor unbound.
    pub fn bind_images(&mut self, outcomes: Vec<LoadOutcome>) {
        for outcome in outcomes {
            match (self.filters.get_mut(&outcome.name), outcome.image) {
                (Some(descriptor), Some(image)) => descriptor.bind(image),
                (Some(_), None) => {}
                (None, _) => debug!("Ignoring load outcome for unknown filter {}", outcome.name),
            }
        }
    }
}

impl FromIterator<(String, FilterDescriptor)> for FilterRegistry {
    fn from_iter<I: IntoIterator<Item = (String, FilterDescriptor)>>(iter: I) -> Self {
        Self {
            filters: iter.into_iter().collect(),
        }
    }
}
