//! Vocabulary shared by the retriever, indexer and engine contract

use serde::{Deserialize, Serialize};
use std::fmt;

/// Metric used to compare vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MetricType {
    /// Euclidean distance; smaller is closer
    #[default]
    L2,
    /// Inner product; larger is closer
    IP,
    /// Cosine similarity; larger is closer
    Cosine,
    /// Bit difference count for binary vectors
    Hamming,
    /// Set dissimilarity for binary vectors
    Jaccard,
    /// Jaccard variant used for molecular fingerprints
    Tanimoto,
    /// A is a subset of B
    Substructure,
    /// B is a subset of A
    Superstructure,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L2 => "L2",
            Self::IP => "IP",
            Self::Cosine => "COSINE",
            Self::Hamming => "HAMMING",
            Self::Jaccard => "JACCARD",
            Self::Tanimoto => "TANIMOTO",
            Self::Substructure => "SUBSTRUCTURE",
            Self::Superstructure => "SUPERSTRUCTURE",
        }
    }

    /// Whether larger scores mean closer vectors.
    ///
    /// Range search reads `radius` as a lower bound for similarity metrics
    /// and as an upper bound for distance metrics.
    pub fn is_similarity(&self) -> bool {
        matches!(self, Self::IP | Self::Cosine)
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-freshness guarantee requested from the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyLevel {
    /// Reads see every write committed before the read
    Strong,
    /// Reads see every write made in the same session
    Session,
    /// Reads see writes older than a bounded staleness window
    #[default]
    Bounded,
    /// Reads eventually see writes
    Eventually,
}

impl ConsistencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Session => "session",
            Self::Bounded => "bounded",
            Self::Eventually => "eventually",
        }
    }
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of vector a field stores or a sub-request searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorKind {
    #[default]
    Dense,
    Sparse,
}

impl fmt::Display for VectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dense => f.write_str("dense"),
            Self::Sparse => f.write_str("sparse"),
        }
    }
}
