//! Ordered fallback chains.
//!
//! Credential selection, base URL resolution and default-model selection
//! all pick "the first candidate that applies". [`Fallback`] expresses that
//! once: candidates are evaluated lazily, in insertion order, and the first
//! `Some` wins.

/// A lazily evaluated, ordered list of candidates.
pub struct Fallback<'a, T> {
    candidates: Vec<Box<dyn FnOnce() -> Option<T> + 'a>>,
}

impl<'a, T: 'a> Fallback<'a, T> {
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    /// Append a candidate. It only runs if every earlier one returned `None`.
    pub fn or_try(mut self, candidate: impl FnOnce() -> Option<T> + 'a) -> Self {
        self.candidates.push(Box::new(candidate));
        self
    }

    /// Append a candidate that is already computed.
    pub fn or_value(self, value: Option<T>) -> Self {
        self.or_try(move || value)
    }

    pub fn resolve(self) -> Option<T> {
        self.candidates.into_iter().find_map(|candidate| candidate())
    }

    pub fn resolve_or(self, default: T) -> T {
        self.resolve().unwrap_or(default)
    }
}

impl<'a, T: 'a> Default for Fallback<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// First non-empty string among `candidates`.
pub fn first_present<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<&'a str> {
    candidates
        .into_iter()
        .fold(Fallback::new(), |chain, c| chain.or_value(c.filter(|s| !s.is_empty())))
        .resolve()
}
