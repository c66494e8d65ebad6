//! Daily digest: gathers design news, renders one HTML+plaintext email and
//! sends it on a schedule.

pub mod archive;
pub mod channels;
pub mod clock;
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod render;
pub mod sources;
