use crate::engine::IndexSpec;
use crate::types::MetricType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Index type and build parameters for a vector field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndexBuilder {
    /// Engine picks the index
    Auto,
    /// Brute force
    Flat,
    IvfFlat {
        nlist: usize,
    },
    IvfSq8 {
        nlist: usize,
    },
    IvfPq {
        nlist: usize,
        /// Number of sub-quantizers
        m: usize,
        nbits: usize,
    },
    Hnsw {
        m: usize,
        ef_construction: usize,
    },
    DiskAnn,
    Scann {
        nlist: usize,
        #[serde(default)]
        with_raw_data: bool,
    },
    SparseInvertedIndex {
        #[serde(default)]
        drop_ratio_build: f64,
    },
    SparseWand {
        #[serde(default)]
        drop_ratio_build: f64,
    },
}

impl IndexBuilder {
    pub fn hnsw() -> Self {
        Self::Hnsw {
            m: 16,
            ef_construction: 200,
        }
    }

    pub fn ivf_flat() -> Self {
        Self::IvfFlat { nlist: 128 }
    }

    pub fn sparse_inverted() -> Self {
        Self::SparseInvertedIndex {
            drop_ratio_build: 0.0,
        }
    }

    /// Engine name of the index type
    pub fn index_type(&self) -> &'static str {
        match self {
            Self::Auto => "AUTOINDEX",
            Self::Flat => "FLAT",
            Self::IvfFlat { .. } => "IVF_FLAT",
            Self::IvfSq8 { .. } => "IVF_SQ8",
            Self::IvfPq { .. } => "IVF_PQ",
            Self::Hnsw { .. } => "HNSW",
            Self::DiskAnn => "DISKANN",
            Self::Scann { .. } => "SCANN",
            Self::SparseInvertedIndex { .. } => "SPARSE_INVERTED_INDEX",
            Self::SparseWand { .. } => "SPARSE_WAND",
        }
    }

    pub fn is_sparse(&self) -> bool {
        matches!(
            self,
            Self::SparseInvertedIndex { .. } | Self::SparseWand { .. }
        )
    }

    /// Check build parameters
    pub fn check(&self) -> Result<(), String> {
        match self {
            Self::IvfFlat { nlist } | Self::IvfSq8 { nlist } | Self::Scann { nlist, .. }
                if *nlist == 0 =>
            {
                Err(format!("{}: nlist must be greater than 0", self.index_type()))
            }
            Self::IvfPq { nlist, m, nbits } => {
                if *nlist == 0 || *m == 0 {
                    Err("IVF_PQ: nlist and m must be greater than 0".to_string())
                } else if !(1..=16).contains(nbits) {
                    Err(format!("IVF_PQ: nbits must be in 1..=16, got {}", nbits))
                } else {
                    Ok(())
                }
            }
            Self::Hnsw { m, ef_construction } if *m == 0 || *ef_construction == 0 => {
                Err("HNSW: m and ef_construction must be greater than 0".to_string())
            }
            Self::SparseInvertedIndex { drop_ratio_build }
            | Self::SparseWand { drop_ratio_build }
                if !(0.0..1.0).contains(drop_ratio_build) =>
            {
                Err(format!(
                    "{}: drop_ratio_build must be in [0, 1), got {}",
                    self.index_type(),
                    drop_ratio_build
                ))
            }
            _ => Ok(()),
        }
    }

    /// Render the engine index description
    pub fn build(&self, metric_type: MetricType) -> IndexSpec {
        let mut params = BTreeMap::new();

        match self {
            Self::Auto | Self::Flat | Self::DiskAnn => {}
            Self::IvfFlat { nlist } | Self::IvfSq8 { nlist } => {
                params.insert("nlist".to_string(), nlist.to_string());
            }
            Self::IvfPq { nlist, m, nbits } => {
                params.insert("nlist".to_string(), nlist.to_string());
                params.insert("m".to_string(), m.to_string());
                params.insert("nbits".to_string(), nbits.to_string());
            }
            Self::Hnsw { m, ef_construction } => {
                params.insert("M".to_string(), m.to_string());
                params.insert("efConstruction".to_string(), ef_construction.to_string());
            }
            Self::Scann {
                nlist,
                with_raw_data,
            } => {
                params.insert("nlist".to_string(), nlist.to_string());
                params.insert("with_raw_data".to_string(), with_raw_data.to_string());
            }
            Self::SparseInvertedIndex { drop_ratio_build } | Self::SparseWand { drop_ratio_build } => {
                params.insert("drop_ratio_build".to_string(), drop_ratio_build.to_string());
            }
        }

        IndexSpec {
            index_type: self.index_type().to_string(),
            metric_type,
            params,
        }
    }
}
