//! Candidate retrieval.
//!
//! A [`CandidateSource`] resolves a query to an ordered candidate list,
//! either by filtering a static list or by calling a caller-supplied
//! retrieval function. The two strategies are never combined. Results then
//! pass through [`post_process`], which is shared by both.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use tracing::error;

use crate::candidate::Candidate;
use crate::error::FetchError;

/// A boxed asynchronous retrieval function.
pub type FetchFn = Rc<dyn Fn(String) -> LocalBoxFuture<'static, Result<Vec<Candidate>, FetchError>>>;

/// Where candidates come from.
#[derive(Clone, Default)]
pub enum CandidateSource {
    /// No source configured: every search is empty.
    #[default]
    Empty,
    /// Substring filtering of a fixed list.
    Static(Vec<Candidate>),
    /// A caller-supplied retrieval function.
    Fetch(FetchFn),
}

impl fmt::Debug for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateSource::Empty => f.write_str("Empty"),
            CandidateSource::Static(data) => f.debug_tuple("Static").field(&data.len()).finish(),
            CandidateSource::Fetch(_) => f.write_str("Fetch(..)"),
        }
    }
}

/// The outcome of starting a search.
pub enum Retrieval {
    /// Results are available now.
    Ready(Vec<Candidate>),
    /// Results arrive when the future resolves. Rejections are already
    /// mapped to an empty list.
    Pending(LocalBoxFuture<'static, Vec<Candidate>>),
}

impl fmt::Debug for Retrieval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Retrieval::Ready(results) => f.debug_tuple("Ready").field(&results.len()).finish(),
            Retrieval::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

impl CandidateSource {
    /// Starts a search for `query`.
    pub fn search(&self, query: &str, case_sensitive: bool) -> Retrieval {
        match self {
            CandidateSource::Empty => Retrieval::Ready(Vec::new()),
            CandidateSource::Static(data) => {
                Retrieval::Ready(filter_static(data, query, case_sensitive))
            }
            CandidateSource::Fetch(fetch) => {
                let fut = fetch(query.to_string());
                Retrieval::Pending(
                    fut.map(|result| match result {
                        Ok(results) => results,
                        Err(err) => {
                            error!(error = %err, "autocomplete: fetchData error");
                            Vec::new()
                        }
                    })
                    .boxed_local(),
                )
            }
        }
    }
}

/// Keeps the candidates whose value contains `query`.
///
/// Order of `data` is preserved.
pub fn filter_static(data: &[Candidate], query: &str, case_sensitive: bool) -> Vec<Candidate> {
    if case_sensitive {
        data.iter()
            .filter(|c| c.value.contains(query))
            .cloned()
            .collect()
    } else {
        let needle = query.to_lowercase();
        data.iter()
            .filter(|c| c.value.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

/// Applies the shared result pipeline: in multi mode, drops candidates
/// whose key is already selected, then truncates to `max_items`.
///
/// Provider order is preserved.
pub fn post_process<'a>(
    results: Vec<Candidate>,
    selected_keys: impl IntoIterator<Item = &'a str>,
    multi: bool,
    max_items: usize,
) -> Vec<Candidate> {
    let mut results = results;
    if multi {
        let selected: HashSet<&str> = selected_keys.into_iter().collect();
        results.retain(|c| !selected.contains(c.key.as_str()));
    }
    results.truncate(max_items);
    results
}
