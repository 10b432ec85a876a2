//! Prompt rendering.

use crate::request::RenderRequest;
use crate::templates::{CLOSING, EXAMPLE, PREAMBLE, REFERENCE_HEADING, RULES, TONE};

/// A delimited region of the prompt that carries caller-supplied text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Documents,
    History,
    Question,
}

impl Section {
    /// All sections in the order they appear in the prompt.
    pub const ALL: [Section; 3] = [Section::Documents, Section::History, Section::Question];

    /// Bare tag name, e.g. `documents`.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Documents => "documents",
            Self::History => "history",
            Self::Question => "question",
        }
    }

    pub fn open_tag(&self) -> &'static str {
        match self {
            Self::Documents => "<documents>",
            Self::History => "<history>",
            Self::Question => "<question>",
        }
    }

    pub fn close_tag(&self) -> &'static str {
        match self {
            Self::Documents => "</documents>",
            Self::History => "</history>",
            Self::Question => "</question>",
        }
    }
}

/// Wraps `body` between the delimiters of `section`, each on its own line.
///
/// The body is inserted verbatim.
pub fn render_section(section: Section, body: &str) -> String {
    format!("{}\n{}\n{}", section.open_tag(), body, section.close_tag())
}

/// Renders the full prompt for `request`.
///
/// Output is deterministic and the three fields are inserted verbatim; text
/// that looks like a delimiter is not escaped.
pub fn render(request: &RenderRequest) -> String {
    let documents = render_section(Section::Documents, &request.documents);
    let history = render_section(Section::History, &request.history);
    let question = render_section(Section::Question, &request.question);

    format!(
        "\n{PREAMBLE}\n\n{TONE}\n\n{REFERENCE_HEADING}\n{documents}\n\n{RULES}\n\n{EXAMPLE}\n\n{history}\n\n{question}\n\n{CLOSING}\n"
    )
}
