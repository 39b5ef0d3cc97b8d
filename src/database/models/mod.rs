pub mod client;
pub mod job;
pub mod request;
pub mod summary;

pub use client::{Client, ClientProfile, ClientUpdate, NewClient, Role};
pub use job::{Job, JobUpdate, NewJob};
pub use request::{JobRequest, NewRequest, RequestStatus, RequestUpdate};
pub use summary::{NewSummary, Summary, SummaryUpdate};
