use async_trait::async_trait;
use clipper_core::{Repository, ShortCode, Shortener, ShortenerError, UrlRecord};
use clipper_generator::Generator;
use jiff::Timestamp;
use std::sync::Arc;
use tracing::{debug, trace};

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Repository` and a `Generator`. Codes are derived
/// from the URL, so shortening the same URL twice within one generator
/// window finds the first record and returns it instead of writing again.
///
/// Note: access counting is a read-modify-write and is not atomic. Concurrent
/// `record_access` calls for the same code may lose increments.
#[derive(Debug, Clone)]
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    pub fn new(repository: R, generator: G) -> Self {
        Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
        }
    }

    /// Returns the repository records are stored in.
    pub fn repository(&self) -> &R {
        &self.repository
    }
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortenerService<R, G> {
    async fn shorten(&self, url: &str) -> Result<UrlRecord, ShortenerError> {
        let code = self.generator.generate(url);

        if let Some(existing) = self.repository.get(&code).await? {
            debug!(code = %code, "URL already shortened in this window");
            return Ok(existing);
        }

        let record = UrlRecord::new(code, url, Timestamp::now());
        // a concurrent shorten may have won; save hands back whichever record is stored
        let stored = self.repository.save(record).await?;
        debug!(code = %stored.code, "Shortened URL");
        Ok(stored)
    }

    async fn lookup(&self, code: &ShortCode) -> Result<Option<UrlRecord>, ShortenerError> {
        trace!(code = %code, "Looking up short code");
        Ok(self.repository.get(code).await?)
    }

    async fn record_access(&self, code: &ShortCode) -> Result<(), ShortenerError> {
        let Some(mut record) = self.repository.get(code).await? else {
            trace!(code = %code, "Access to unknown short code ignored");
            return Ok(());
        };

        record.record_access();
        self.repository.update(&record).await?;
        trace!(code = %code, access_count = record.access_count, "Recorded access");
        Ok(())
    }
}
