//! Callable model handles

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::apireq::Endpoint;
use super::providers::ProviderKey;

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a constructed handle. Clones of a handle share it; two
/// separately constructed handles for the same model do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct HandleId(u64);

#[derive(Debug)]
struct HandleInner {
    id: HandleId,
    provider: ProviderKey,
    model: String,
    endpoint: Endpoint,
}

/// Everything needed to call one model on one provider. Handles are cheap to
/// clone and are compared by identity.
#[derive(Debug, Clone)]
pub(crate) struct ModelHandle {
    inner: Arc<HandleInner>,
}

impl ModelHandle {
    pub(crate) fn new(provider: ProviderKey, model: &str, endpoint: Endpoint) -> ModelHandle {
        let id = HandleId(NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed));

        ModelHandle {
            inner: Arc::new(HandleInner {
                id,
                provider,
                model: model.to_string(),
                endpoint,
            }),
        }
    }

    pub(crate) fn id(&self) -> HandleId {
        self.inner.id
    }

    pub(crate) fn provider(&self) -> &ProviderKey {
        &self.inner.provider
    }

    pub(crate) fn model(&self) -> &str {
        &self.inner.model
    }

    pub(crate) fn endpoint(&self) -> &Endpoint {
        &self.inner.endpoint
    }
}

impl PartialEq for ModelHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ModelHandle {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::apireq::Auth;

    fn endpoint() -> Endpoint {
        Endpoint::new("https://api.openai.com/v1", Auth::None).unwrap()
    }

    #[test]
    fn test_identity() {
        let a = ModelHandle::new("openai".into(), "gpt-4.1", endpoint());
        let b = ModelHandle::new("openai".into(), "gpt-4.1", endpoint());

        assert_eq!(a, a.clone());
        assert_eq!(a.id(), a.clone().id());
        assert_ne!(a, b);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.model(), b.model());
    }
}
