pub mod config;
pub mod corpus;
pub mod dataset;
pub mod embedder;
pub mod openai_client;
pub mod prompt_builder;
pub mod search;
pub mod tokenizer;
