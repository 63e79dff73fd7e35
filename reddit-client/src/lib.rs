pub mod api;

pub use api::{
    ActivitySource, CommentData, CommentListing, PushshiftClient, SubmissionData,
    SubmissionListing,
};
