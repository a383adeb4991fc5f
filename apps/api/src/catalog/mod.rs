// Reference catalog: skills, jobs, certifications and internships.
// Reads are public; writes are admin-only.

pub mod handlers;
pub mod matching;
