//! BROSTAR registry adapter
//!
//! HTTP integration with the BROSTAR API: the authenticated client, the
//! wire types of its responses, and the read-modify-write document fetcher
//! corrections are built on.

pub mod client;
pub mod fetcher;
pub mod models;

pub use client::{BrostarClient, BrostarEndpoint};
pub use fetcher::DocumentFetcher;
pub use models::{Paginated, UploadTaskRecord};
