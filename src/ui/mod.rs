pub mod controller;
pub mod render;
pub mod session;

pub use controller::{Controller, ErrorFeedback, ExplainRequest, Ticket, WordProblemRequest};
pub use session::{Command, Session};
