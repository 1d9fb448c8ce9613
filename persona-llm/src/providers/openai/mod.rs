//! OpenAI-compatible chat completions provider
//!
//! Works against api.openai.com and any server exposing the same
//! `/chat/completions` contract (vLLM, llama.cpp server, Ollama's OpenAI
//! endpoint).

pub mod client;
pub mod generator;
pub mod types;

pub use client::OpenAiClient;
pub use generator::OpenAiCompatibleGenerator;
