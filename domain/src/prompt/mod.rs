//! Prompt domain
//!
//! Request construction for each model call in the workflow. The wording is
//! business policy; stages only depend on the table format it asks for.

mod template;

pub use template::PromptTemplate;
