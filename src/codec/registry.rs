use std::sync::Arc;

use crate::foundation::error::{PipelineError, PipelineResult};

/// Constructor stored in a [`Registry`].
pub type Factory<S, T> = Arc<dyn Fn(&S) -> PipelineResult<Box<T>> + Send + Sync>;

/// Capability tag to constructor map.
///
/// Registration order is preference order, used when the caller leaves the tag empty.
pub struct Registry<S, T: ?Sized> {
    kind: &'static str,
    entries: Vec<(String, Factory<S, T>)>,
}

impl<S, T: ?Sized> Clone for Registry<S, T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            entries: self.entries.clone(),
        }
    }
}

impl<S, T: ?Sized> Registry<S, T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Register `factory` under `tag`. Re-registering a tag replaces it in place.
    pub fn register<F>(&mut self, tag: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&S) -> PipelineResult<Box<T>> + Send + Sync + 'static,
    {
        let tag = tag.into();
        let factory: Factory<S, T> = Arc::new(factory);
        match self.entries.iter_mut().find(|(t, _)| *t == tag) {
            Some(entry) => entry.1 = factory,
            None => self.entries.push((tag, factory)),
        }
        self
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.iter().any(|(t, _)| t == tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Construct the `tag` variant. Unknown tags and constructor failures are `FatalInit`.
    pub fn create(&self, tag: &str, settings: &S) -> PipelineResult<Box<T>> {
        let Some((_, factory)) = self.entries.iter().find(|(t, _)| t == tag) else {
            return Err(PipelineError::fatal_init(
                self.kind,
                format!(
                    "no {} registered for '{tag}' (available: {})",
                    self.kind,
                    self.available()
                ),
            ));
        };
        factory(settings).map_err(|e| e.into_fatal_init(self.kind))
    }

    /// Construct `tag` when given, else the first variant that constructs successfully.
    pub fn create_preferred(
        &self,
        tag: Option<&str>,
        settings: &S,
    ) -> PipelineResult<(String, Box<T>)> {
        if let Some(tag) = tag.filter(|t| !t.is_empty()) {
            return self.create(tag, settings).map(|v| (tag.to_owned(), v));
        }
        let mut failures = Vec::new();
        for (tag, factory) in &self.entries {
            match factory(settings) {
                Ok(v) => return Ok((tag.clone(), v)),
                Err(e) => {
                    tracing::debug!(kind = self.kind, %tag, error = %e, "backend unavailable, trying next");
                    failures.push(format!("{tag}: {e}"));
                }
            }
        }
        Err(PipelineError::fatal_init(
            self.kind,
            if failures.is_empty() {
                format!("no {} registered", self.kind)
            } else {
                format!("no usable {} ({})", self.kind, failures.join("; "))
            },
        ))
    }

    fn available(&self) -> String {
        let tags: Vec<&str> = self.tags().collect();
        if tags.is_empty() {
            "none".to_owned()
        } else {
            tags.join(", ")
        }
    }
}

impl<S, T: ?Sized> std::fmt::Debug for Registry<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("kind", &self.kind)
            .field("tags", &self.tags().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/codec/registry.rs"]
mod tests;
