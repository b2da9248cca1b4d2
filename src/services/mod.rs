pub mod chunker;
pub mod extractor;
pub mod generation_client;
pub mod prompt_builder;
pub mod quiz_parser;
pub mod quiz_service;
pub mod quiz_session;
pub mod scorer;
