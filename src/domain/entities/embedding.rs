use serde::Serialize;

/// A face embedding: a fixed-dimensionality vector produced by the
/// remote inference service.
///
/// The dimensionality (512) is fixed by the inference backend and by the
/// vector store collection schema, not enforced here. An embedding is
/// never mutated after creation: it is either returned to the caller or
/// handed to the vector repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}
