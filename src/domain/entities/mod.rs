pub mod embedding;
pub mod user;
