//! Static text of the prompt template.
//!
//! The bracketed tokens (`[DOMAIN]`, `[OBJECTIVE]`, `[definition]`,
//! `[reference]`) are meant to be edited by hand before the template is put to
//! use. They are never substituted at render time.

/// Role and objective preamble.
pub const PREAMBLE: &str = "You will be acting as a helpful assistant specializing in [DOMAIN]. Your goal is to [OBJECTIVE].";

/// Tone instruction.
pub const TONE: &str = "You should maintain a professional yet approachable tone.";

/// Heading placed directly above the documents section.
pub const REFERENCE_HEADING: &str = "Reference material:";

/// Rules the assistant must follow.
pub const RULES: &str = r#"Rules:
- Cite sources when referencing documents
- State clearly if information is not available
- Ask for clarification if question is unclear"#;

/// Worked example of a grounded answer.
pub const EXAMPLE: &str = r#"<example>
User: What is X?
Assistant: Based on the documents, X is [definition]. Source: [reference].
</example>"#;

/// Closing instruction.
pub const CLOSING: &str = "Provide a clear response. Think through your answer first.";

/// Placeholder tokens left for manual customization.
pub const MANUAL_PLACEHOLDERS: [&str; 2] = ["[DOMAIN]", "[OBJECTIVE]"];
