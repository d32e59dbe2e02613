use std::sync::Arc;

use crate::cache::SemanticCache;

#[derive(Clone)]
pub struct HandlerState {
    pub cache: Arc<SemanticCache>,

    /// Set when serving canned responses (reported by `/ready`).
    pub mock_provider: bool,
}

impl HandlerState {
    pub fn new(cache: Arc<SemanticCache>) -> Self {
        let mock_provider = cache.generator().is_mock();
        Self {
            cache,
            mock_provider,
        }
    }
}
