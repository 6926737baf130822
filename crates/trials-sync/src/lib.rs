//! Incremental sync engine for the clinical trials mirror.
//!
//! - [`source`]: the paginated external query, as a trait.
//! - [`client`]: its ClinicalTrials.gov v2 HTTP implementation.
//! - [`fetch`]: cursor-driven pagination with a courtesy delay and bounded
//!   retry, yielding pages of normalised records lazily.
//! - [`sync`]: full load and incremental sync, reconciling each page into a
//!   [`TrialStore`](trials_core::store::TrialStore) as it arrives.

#![allow(async_fn_in_trait)]

pub mod client;
pub mod error;
pub mod fetch;
pub mod source;
pub mod sync;

pub use client::{ClientConfig, ClinicalTrialsClient};
pub use error::{Error, FetchError, Result};
pub use fetch::{FetchConfig, Fetcher, Page};
pub use source::{PageQuery, PageSource, RawPage};
pub use sync::{SyncMode, SyncReport, Syncer};

#[cfg(test)]
mod test_support;
