//! Key sources for persistent bindings.

use crate::types::ArticleId;
use tokio::sync::watch;

/// Produces the persistence key of a binding, or `None` when the bound value
/// is intentionally unpersisted (for example while no article is active).
#[derive(Debug, Clone)]
pub struct KeySource {
    scope: watch::Receiver<Option<String>>,
    suffix: Option<String>,
}

impl KeySource {
    /// A key that never changes, for global singletons such as `lastActiveTitle`.
    pub fn fixed(key: impl Into<String>) -> Self {
        let (_tx, rx) = watch::channel(Some(key.into()));
        Self {
            scope: rx,
            suffix: None,
        }
    }

    /// `<articleId>:<suffix>` while an article is active, `None` otherwise.
    pub fn scoped(scope: watch::Receiver<Option<ArticleId>>, suffix: impl Into<String>) -> Self {
        Self {
            scope,
            suffix: Some(suffix.into()),
        }
    }

    /// Current key.
    pub fn current(&self) -> Option<String> {
        let scope = self.scope.borrow();
        match (&*scope, &self.suffix) {
            (Some(id), Some(suffix)) => Some(format!("{}:{}", id, suffix)),
            (Some(key), None) => Some(key.clone()),
            (None, _) => None,
        }
    }

    /// Stable description used in binding identities.
    pub fn describe(&self) -> String {
        match &self.suffix {
            Some(suffix) => format!("<article>:{}", suffix),
            None => self.current().unwrap_or_default(),
        }
    }

    /// Resolves when the underlying scope may have changed.
    ///
    /// Errors once the scope can no longer change (fixed keys, dropped scope).
    pub(crate) async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.scope.changed().await
    }
}
