// Shared prompt constants.
// Each task that needs an LLM call defines its own templates alongside it
// (see resume::prompts). This file holds what every call sends.

/// System message sent with every completion request.
pub const RESUME_WRITER_SYSTEM: &str =
    "You are a professional resume writer with expertise in creating and optimizing resumes.";
