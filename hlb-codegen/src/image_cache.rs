use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use hlb_solve::{ImageDigest, Platform, Registry, RegistryError};
use tokio::sync::OnceCell;

type Key = (String, Option<String>);

/// Memoizes `(reference, platform) -> digest` the same single-flight
/// `Arc<Mutex<HashMap<Key, Arc<OnceCell<_>>>>>` shape `hlb-resolver` uses for
/// its module-digest cache (§4.9) — smaller key space, same pattern, so it's
/// documented once here rather than duplicated.
pub struct CachedImageResolver<'a, R> {
    registry: &'a R,
    cache: Mutex<HashMap<Key, Arc<OnceCell<ImageDigest>>>>,
}

impl<'a, R: Registry> CachedImageResolver<'a, R> {
    pub fn new(registry: &'a R) -> Self {
        Self {
            registry,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn resolve(
        &self,
        reference: &str,
        platform: Option<&Platform>,
    ) -> Result<ImageDigest, RegistryError> {
        let key = (
            reference.to_string(),
            platform.map(|p| format!("{}/{}", p.os, p.arch)),
        );
        let cell = {
            let mut cache = self.cache.lock().unwrap();
            cache
                .entry(key)
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };
        cell.get_or_try_init(|| self.registry.resolve_image(reference, platform))
            .await
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlb_solve::fake::InMemoryRegistry;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingRegistry {
        inner: InMemoryRegistry,
        calls: AtomicUsize,
    }

    impl Registry for CountingRegistry {
        async fn resolve_image(
            &self,
            reference: &str,
            platform: Option<&Platform>,
        ) -> Result<ImageDigest, RegistryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.resolve_image(reference, platform).await
        }
    }

    #[tokio::test]
    async fn repeated_lookups_hit_the_registry_once() {
        let inner = InMemoryRegistry::new();
        inner.seed("alpine:3.19", None, "sha256:abc");
        let registry = CountingRegistry {
            inner,
            calls: AtomicUsize::new(0),
        };
        let cached = CachedImageResolver::new(&registry);

        let a = cached.resolve("alpine:3.19", None).await.unwrap();
        let b = cached.resolve("alpine:3.19", None).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(registry.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_platforms_are_cached_separately() {
        let inner = InMemoryRegistry::new();
        inner.seed("alpine:3.19", Some("linux/amd64"), "sha256:amd64");
        inner.seed("alpine:3.19", Some("linux/arm64"), "sha256:arm64");
        let registry = CountingRegistry {
            inner,
            calls: AtomicUsize::new(0),
        };
        let cached = CachedImageResolver::new(&registry);

        let amd = cached
            .resolve(
                "alpine:3.19",
                Some(&Platform {
                    os: "linux".into(),
                    arch: "amd64".into(),
                }),
            )
            .await
            .unwrap();
        let arm = cached
            .resolve(
                "alpine:3.19",
                Some(&Platform {
                    os: "linux".into(),
                    arch: "arm64".into(),
                }),
            )
            .await
            .unwrap();
        assert_ne!(amd, arm);
        assert_eq!(registry.calls.load(Ordering::SeqCst), 2);
    }
}
