// src/parser/prompt.rs
//! Instruction template sent to the model.

/// Render the fixed extraction prompt for a resume text.
///
/// The JSON schema named here is the contract with the model; the fields
/// must match `ResumeRecord`'s serialized form exactly, and the
/// instructions require `null` (never a fabricated value) for anything the
/// model cannot determine.
pub fn build_prompt(resume_text: &str) -> String {
    format!(
        r#"You are an expert resume parser. Extract the following information from the resume and respond ONLY with valid JSON, no markdown formatting:

{{
  "name": "Full name",
  "phone": "Phone number or null if not found",
  "email": "Email address or null if not found",
  "position": "Current or most recent job position/title or null if not found",
  "summary": "Brief professional summary (2-3 sentences) or null",
  "primarySkills": ["List of 5-8 core technical skills"],
  "secondarySkills": ["List of additional supporting skills"],
  "experience": "Years of professional experience or null",
  "education": "Highest education qualification or null",
  "skillsSource": "Brief explanation of how skills were determined"
}}

Instructions:
1. Extract name, phone, email, and position directly from the resume
2. Identify primary skills as core technical competencies mentioned most frequently
3. Identify secondary skills as supporting technologies and tools
4. If skills aren't explicitly listed, infer from projects, work experience, and education
5. Return ONLY valid JSON with no markdown backticks, no preamble, no explanation
6. Use null for any field that cannot be determined
7. Ensure all arrays and strings are properly quoted

Resume:
{resume_text}"#
    )
}
