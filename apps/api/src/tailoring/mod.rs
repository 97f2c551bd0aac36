// Résumé tailoring: PDF résumé + job-posting URL → rewritten résumé.
// The LLM step is an `Agent`; the handler sequences PDF parse → web fetch → LLM call.

pub mod agent;
pub mod handlers;
pub mod prompts;
