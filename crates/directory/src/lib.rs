//! Membership directory access: the `Directory` seam, its HTTP client,
//! account resource discovery, and invoice/payment submission.

pub mod api;
pub mod client;
pub mod error;
pub mod resources;
pub mod submit;

pub use api::{Directory, DirectoryCall, MockDirectory};
pub use client::{ApiConfig, DirectoryClient};
pub use error::DirectoryError;
pub use resources::AccountResources;
pub use submit::{
    SubmissionDriver, SubmissionReport, SubmissionSettings, SubmitError, SubmittedPair,
    DEFAULT_TENDER_NAME,
};
