pub mod embedding_qdrant_repository;
pub mod face_embedder_grpc_client;
pub mod user_postgres_repository;
