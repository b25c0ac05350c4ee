use crate::settings::ServiceSettings;
use crate::shortener::{LinkCount, Result, Shortener};
use async_trait::async_trait;
use burrow_cache::CacheLayer;
use burrow_core::{ShortCode, ShortLink, ShortenerError, Store, UrlCache};
use burrow_generator::Generator;
use burrow_storage::{IndexRegistry, LinkRepository, ShardRouter};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// The link service.
///
/// Creation runs generator, existence check, insert on the owning shard, then
/// registration in the index. Lookups go through the cache first and fall
/// back to the shard; every successful lookup bumps the hit count in the
/// background. Deletion invalidates the cache before touching the durable
/// rows and again after them, so a lookup that read the row before it was
/// removed cannot leave it cached.
pub struct LinkService<S, C, G> {
    links: LinkRepository<S>,
    registry: IndexRegistry<S>,
    cache: CacheLayer<C>,
    generator: G,
    settings: ServiceSettings,
}

impl<S: Store, C: UrlCache, G: Generator> LinkService<S, C, G> {
    pub fn new(router: ShardRouter<S>, cache: C, generator: G, settings: ServiceSettings) -> Self {
        let router = Arc::new(router);
        info!(
            mode = %router.mode(),
            shards = router.shard_count(),
            existence_policy = ?settings.existence_policy,
            "link service ready"
        );

        Self {
            links: LinkRepository::new(Arc::clone(&router), settings.operation_timeout),
            registry: IndexRegistry::new(router, settings.storage()),
            cache: CacheLayer::new(cache),
            generator,
            settings,
        }
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Validates that the URL is http(s) with a host.
    fn validate_url(url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(ShortenerError::InvalidUrl(
                "URL cannot be empty".to_string(),
            ));
        }

        let Some((scheme, rest)) = url.split_once("://") else {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must have a valid scheme and host: {}",
                url
            )));
        };

        let scheme = scheme.to_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL scheme must be http or https: {}",
                scheme
            )));
        }

        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        if host.is_empty() || host.chars().any(char::is_whitespace) {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must have a valid scheme and host: {}",
                url
            )));
        }

        Ok(())
    }

    /// Derives the code for `original_url` and checks it against the index.
    ///
    /// A code that is already registered is a [`ShortenerError::Collision`];
    /// no alternative is tried.
    pub async fn generate(&self, original_url: &str) -> Result<ShortCode> {
        let code = self.generator.generate(original_url);
        trace!(code = %code, "Generated candidate short code");

        if self.registry.exists(&code).await? {
            debug!(code = %code, "Candidate short code already registered");
            return Err(ShortenerError::Collision(code.to_string()));
        }
        Ok(code)
    }

    /// Bumps the hit count without holding up the lookup.
    ///
    /// A missing index entry means the link was deleted while the lookup was
    /// in flight, so the cached copy is dropped too.
    fn record_hit(&self, code: &ShortCode) {
        let registry = self.registry.clone();
        let cache = self.cache.clone();
        let code = code.clone();

        tokio::spawn(async move {
            match registry.increment(&code).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!(code = %code, "Resolved link is no longer indexed, dropping cached copy");
                    cache.invalidate(&code).await;
                }
                Err(e) => warn!(code = %code, error = %e, "Failed to increment hit count"),
            }
        });
    }
}

#[async_trait]
impl<S: Store, C: UrlCache, G: Generator> Shortener for LinkService<S, C, G> {
    async fn shorten(&self, original_url: &str) -> Result<ShortLink> {
        Self::validate_url(original_url)?;

        let code = self.generate(original_url).await?;
        let link = self.links.insert(&code, original_url).await?;

        if let Err(e) = self.registry.register(&code).await {
            // without an index entry the link would be unreachable for
            // existence checks and counts, so take it back out
            match self.links.delete(&code).await {
                Ok(_) => warn!(code = %code, error = %e, "Index registration failed, link removed"),
                Err(cleanup) => error!(
                    code = %code,
                    error = %e,
                    cleanup_error = %cleanup,
                    "Index registration failed and the link could not be removed"
                ),
            }
            return Err(ShortenerError::Registration(code.to_string()));
        }

        info!(code = %code, id = link.id, "Created short link");
        Ok(link)
    }

    async fn resolve(&self, code: &ShortCode) -> Result<String> {
        if let Some(url) = self.cache.get(code).await {
            self.record_hit(code);
            return Ok(url);
        }

        let link = self
            .links
            .get(code)
            .await?
            .ok_or_else(|| ShortenerError::NotFound(code.to_string()))?;

        self.cache
            .set(code, &link.original_url, self.settings.cache_ttl)
            .await;
        self.record_hit(code);

        Ok(link.original_url)
    }

    async fn count(&self, code: &ShortCode) -> Result<LinkCount> {
        let count = self
            .registry
            .count(code)
            .await?
            .ok_or_else(|| ShortenerError::NotFound(code.to_string()))?;

        Ok(LinkCount {
            short_code: code.clone(),
            count,
        })
    }

    async fn delete(&self, code: &ShortCode) -> Result<()> {
        self.cache.invalidate(code).await;

        if !self.links.delete(code).await? {
            return Err(ShortenerError::NotFound(code.to_string()));
        }

        let unregistered = self.registry.unregister(code).await;
        // a lookup that read the row before it was removed may have cached it
        self.cache.invalidate(code).await;

        match unregistered {
            Ok(true) => {}
            Ok(false) => warn!(code = %code, "Deleted link had no index entry"),
            Err(e) => {
                error!(code = %code, error = %e, "Link deleted but its index entry was not");
                return Err(ShortenerError::IndexCleanup(code.to_string()));
            }
        }

        info!(code = %code, "Deleted short link");
        Ok(())
    }
}
