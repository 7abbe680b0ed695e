// Prompt templates and builders for the two résumé tasks.
// Builders are pure: the same input always yields the same prompt.
// Both prompts end with the JSON shape the reply is recovered against
// (see resume::recovery).

use crate::resume::models::{text_of, UserInfoRecord};

pub const OPTIMIZATION_INTRO: &str = "Please optimize and improve the following resume:";

pub const JOB_TAILORING_INTRO: &str =
    "Please tailor this resume to the following job description:";

/// Instructions and output contract for optimization. Keys must match
/// `OptimizationResult`.
pub const OPTIMIZATION_INSTRUCTIONS: &str = r#"Please provide the result in the following format:

- First, provide the complete optimized resume content.
- Then, list the key improvements made.
- Finally, give 3-5 additional suggestions for further improvement.

Optimize for clarity, impact, quantification of achievements, and professional language.
Remove any fluff, use action verbs, and ensure the resume is concise but comprehensive.

Format your response as JSON with the following structure:
{
    "optimized_content": "The full optimized resume text",
    "improvements": ["List of specific improvements made"],
    "suggestions": ["List of additional suggestions"]
}"#;

pub const SUMMARY_ENHANCEMENT_CLAUSE: &str =
    "- Please enhance and polish the professional summary.";

pub const SKILLS_ORGANIZATION_CLAUSE: &str =
    "- Please organize and categorize skills for better presentation.";

/// Instructions and output contract for generation. Keys must match
/// `GenerationResult`, nested under `content`.
pub const GENERATION_INSTRUCTIONS: &str = r#"Please provide the result as a complete, ready-to-use professional resume.
Use clear section headings, bullet points where appropriate, and professional formatting.
Quantify achievements where possible and use action verbs.

Format your response as JSON with the following structure:
{
    "content": {
        "summary": "Enhanced professional summary",
        "experience": "Formatted work experience section",
        "education": "Formatted education section",
        "skills": "Organized skills section",
        "additional": "Any additional information formatted appropriately"
    }
}"#;

/// Builds the optimization prompt. The tailoring clause is only added for a
/// job description with visible content.
pub fn build_optimization_prompt(resume_text: &str, job_description: Option<&str>) -> String {
    let mut prompt = String::new();
    prompt.push_str(OPTIMIZATION_INTRO);
    prompt.push_str("\n\n");
    prompt.push_str(resume_text);
    prompt.push_str("\n\n");

    if let Some(job) = job_description.filter(|j| !j.trim().is_empty()) {
        prompt.push_str(JOB_TAILORING_INTRO);
        prompt.push_str("\n\n");
        prompt.push_str(job);
        prompt.push_str("\n\n");
    }

    prompt.push_str(OPTIMIZATION_INSTRUCTIONS);
    prompt
}

/// Builds the generation prompt from a user-information record.
pub fn build_generation_prompt(info: &UserInfoRecord) -> String {
    let contact = &info.contact;
    let name = text_of(&contact.name);
    let style = &info.style;

    let mut prompt = if name.trim().is_empty() {
        "Please create a professional resume with the following information:".to_string()
    } else {
        format!("Please create a professional resume for {name} with the following information:")
    };

    prompt.push_str(&format!(
        "\n\nCONTACT INFORMATION:\nName: {}\nEmail: {}\nPhone: {}\nLocation: {}\n",
        name,
        text_of(&contact.email),
        text_of(&contact.phone),
        text_of(&contact.location),
    ));

    for (label, body) in [
        ("PROFESSIONAL SUMMARY", &info.summary),
        ("WORK EXPERIENCE", &info.experience),
        ("EDUCATION", &info.education),
        ("SKILLS", &info.skills),
        ("ADDITIONAL INFORMATION", &info.additional),
    ] {
        prompt.push_str(&format!("\n{label}:\n{}\n", text_of(body)));
    }

    let target_job = text_of(&info.target_job);
    if !target_job.trim().is_empty() {
        prompt.push_str(&format!("\nTARGET JOB/ROLE: {target_job}\n"));
    }

    prompt.push_str(&format!(
        "\nSTYLE PREFERENCES:\n- Layout: {}\n- Length: {}\n- Tone: {}\n- Focus: {}\n",
        style.layout, style.length, style.tone, style.focus
    ));
    if style.auto_summary {
        prompt.push_str(SUMMARY_ENHANCEMENT_CLAUSE);
        prompt.push('\n');
    }
    if style.auto_skills {
        prompt.push_str(SKILLS_ORGANIZATION_CLAUSE);
        prompt.push('\n');
    }

    prompt.push('\n');
    prompt.push_str(GENERATION_INSTRUCTIONS);
    prompt
}
