pub mod embedder_client;
pub mod user_repository;
pub mod vector_repository;
