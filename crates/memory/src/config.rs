//! Paging configuration for the in-memory collaborators.

/// Default number of entries per page when `_count` is absent.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Upper bound applied to `_count`.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Paging limits shared by search and history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryConfig {
    /// Page size used when the request has no `_count`.
    pub default_page_size: usize,
    /// Largest page size honoured; larger `_count` values are clamped.
    pub max_page_size: usize,
}

impl MemoryConfig {
    /// Creates a configuration, clamping the default to the maximum.
    pub fn new(default_page_size: usize, max_page_size: usize) -> Self {
        Self {
            default_page_size: default_page_size.min(max_page_size),
            max_page_size,
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MemoryConfig::default();
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 1000);
    }

    #[test]
    fn test_new_clamps_default() {
        let config = MemoryConfig::new(50, 10);
        assert_eq!(config.default_page_size, 10);
    }
}
