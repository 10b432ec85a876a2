//! Renders a prompt from documents, conversation history and a question by
//! interpolating them into a fixed template.
//!
//! ```
//! use prompt_template::{RenderRequest, render};
//!
//! let request = RenderRequest::new("Doc A: cats are mammals.", "User: hi", "What is a cat?");
//! let prompt = render(&request);
//! assert!(prompt.contains("<question>\nWhat is a cat?\n</question>"));
//! ```

pub mod config;
pub mod logging;
pub mod render;
pub mod request;
pub mod templates;
pub mod validators;

pub use render::{Section, render};
pub use request::RenderRequest;
