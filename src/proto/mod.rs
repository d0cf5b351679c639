//! Checked-in tonic-generated code for `proto/face_embedder.proto`.
//!
//! The gateway only consumes this service, so the code was generated
//! with `build_server(false)` and committed to avoid a protoc build
//! dependency.

pub mod face_embedder;
