use crate::port::ReadingsRepository;
use crate::t;

use super::{ReadingKind, ReadingsResult, TimeWindow};

#[derive(Debug, Clone)]
pub struct ReadingsQuery<R> {
    repo: R,
}

impl<R: ReadingsRepository> ReadingsQuery<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    #[tracing::instrument(skip_all, fields(kind = %kind, window = window.name()))]
    pub async fn query(&self, kind: ReadingKind, window: TimeWindow) -> anyhow::Result<ReadingsResult> {
        infrastructure::meter::increment("readings_query", &[("kind", kind.path()), ("window", window.name())]);

        match window.range_at(t!(now)) {
            None => Ok(ReadingsResult::Latest(self.repo.latest(kind).await?)),
            Some(range) => {
                let readings = self.repo.between(kind, &range).await?;
                tracing::debug!("Found {} {} readings in {}", readings.len(), kind, range);

                Ok(ReadingsResult::Series { range, readings })
            }
        }
    }
}
