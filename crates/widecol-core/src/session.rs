//! Session settings that steer metadata lookups

use std::fmt;
use std::sync::Arc;

use crate::metadata::MetadataProvider;

/// Connection-level state a resolver consults while resolving tables
#[derive(Clone)]
pub struct Session {
    provider: Arc<dyn MetadataProvider>,
    auto_commit: bool,
}

impl Session {
    /// New auto-commit session over a shared provider
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self {
            provider,
            auto_commit: true,
        }
    }

    pub fn with_auto_commit(mut self, auto_commit: bool) -> Self {
        self.auto_commit = auto_commit;
        self
    }

    pub fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    pub fn provider(&self) -> &dyn MetadataProvider {
        self.provider.as_ref()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("auto_commit", &self.auto_commit)
            .finish_non_exhaustive()
    }
}
