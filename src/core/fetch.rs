use crate::services::StoreError;
use futures::future::join_all;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use thiserror::Error;

/// Which independent read a fetch belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStage {
    Inventory,
    Preferences,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStage::Inventory => f.write_str("inventory"),
            FetchStage::Preferences => f.write_str("preferences"),
        }
    }
}

/// One failed read, tagged with its stage
#[derive(Debug, Error)]
#[error("{stage} fetch failed: {source}")]
pub struct FetchFailure {
    pub stage: FetchStage,
    #[source]
    pub source: StoreError,
}

/// Every failure from one concurrent fetch, in declaration order
#[derive(Debug, Error)]
#[error("{first}{}", more_suffix(.rest))]
pub struct FetchErrors {
    first: FetchFailure,
    rest: Vec<FetchFailure>,
}

fn more_suffix(rest: &[FetchFailure]) -> String {
    if rest.is_empty() {
        String::new()
    } else {
        format!(" (and {} more)", rest.len())
    }
}

impl FetchErrors {
    fn single(first: FetchFailure) -> Self {
        Self {
            first,
            rest: Vec::new(),
        }
    }

    /// Gather the failures from a set of finished reads, in declaration order
    fn from_failures<I>(failures: I) -> Option<Self>
    where
        I: IntoIterator<Item = FetchFailure>,
    {
        let mut failures = failures.into_iter();
        let first = failures.next()?;
        Some(Self {
            first,
            rest: failures.collect(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &FetchFailure> {
        std::iter::once(&self.first).chain(self.rest.iter())
    }

    /// The failure of the earliest declared read
    pub fn into_first(self) -> FetchFailure {
        self.first
    }
}

/// Run two independent reads concurrently and wait for both
///
/// Neither read is cancelled when the other fails; both always run to
/// completion. The result fails if either read failed, carrying every
/// failure with its stage.
pub async fn fetch_both<A, B, FA, FB>(
    (stage_a, read_a): (FetchStage, FA),
    (stage_b, read_b): (FetchStage, FB),
) -> Result<(A, B), FetchErrors>
where
    FA: Future<Output = Result<A, StoreError>>,
    FB: Future<Output = Result<B, StoreError>>,
{
    match tokio::join!(read_a, read_b) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(source), Ok(_)) => Err(FetchErrors::single(FetchFailure { stage: stage_a, source })),
        (Ok(_), Err(source)) => Err(FetchErrors::single(FetchFailure { stage: stage_b, source })),
        (Err(source_a), Err(source_b)) => Err(FetchErrors {
            first: FetchFailure { stage: stage_a, source: source_a },
            rest: vec![FetchFailure { stage: stage_b, source: source_b }],
        }),
    }
}

/// Run any number of reads of the same shape concurrently and wait for all
///
/// Values come back in the order the reads were given.
pub async fn fetch_all<T, F, I>(reads: I) -> Result<Vec<T>, FetchErrors>
where
    I: IntoIterator<Item = (FetchStage, F)>,
    F: Future<Output = Result<T, StoreError>>,
{
    let (stages, reads): (Vec<FetchStage>, Vec<F>) = reads.into_iter().unzip();
    let results = join_all(reads).await;

    let mut values = Vec::with_capacity(results.len());
    let mut failures = Vec::new();

    for (stage, result) in stages.into_iter().zip(results) {
        match result {
            Ok(value) => values.push(value),
            Err(source) => failures.push(FetchFailure { stage, source }),
        }
    }

    match FetchErrors::from_failures(failures) {
        Some(errors) => Err(errors),
        None => Ok(values),
    }
}
