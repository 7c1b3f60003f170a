//! Construction options shared by the growing containers.

use crate::engine::{DEFAULT_LOAD_FACTOR, MIN_CAPACITY};

/// How `cursor()` obtains its iteration state.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum IterationMode {
    /// Reuse the cursor state embedded in the container. Starting a new
    /// cursor resets the previous one.
    #[default]
    Cached,
    /// Give every cursor its own state.
    Fresh,
}

/// Initial capacity, load factor and iteration mode for a table.
///
/// Validation happens when a container is built from the config, so a
/// config value itself is always constructible.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TableConfig {
    pub(crate) initial_capacity: usize,
    pub(crate) load_factor: f32,
    pub(crate) iteration: IterationMode,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: MIN_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
            iteration: IterationMode::Cached,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested slot count; rounded up to a power of two with a floor of
    /// `MIN_CAPACITY`.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn with_iteration_mode(mut self, iteration: IterationMode) -> Self {
        self.iteration = iteration;
        self
    }

    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    pub fn iteration_mode(&self) -> IterationMode {
        self.iteration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let c = TableConfig::new()
            .with_initial_capacity(100)
            .with_load_factor(0.5)
            .with_iteration_mode(IterationMode::Fresh);
        assert_eq!(c.initial_capacity(), 100);
        assert_eq!(c.load_factor(), 0.5);
        assert_eq!(c.iteration_mode(), IterationMode::Fresh);

        let d = TableConfig::default();
        assert_eq!(d.initial_capacity(), MIN_CAPACITY);
        assert_eq!(d.load_factor(), DEFAULT_LOAD_FACTOR);
        assert_eq!(d.iteration_mode(), IterationMode::Cached);
    }
}
