//! JSON signature files
//!
//! A signature file stores a [`Clusters`] collection:
//!
//! ```json
//! { "clusters": [ { "class_id": 1, "mean": [..], "covariance": [[..], ..], "pixel_count": 120 } ] }
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cluster::{Cluster, ClusterStatistics, Clusters};
use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SignatureRecord {
    class_id: i32,
    mean: Vec<f64>,
    covariance: Vec<Vec<f64>>,
    pixel_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SignatureFile {
    clusters: Vec<SignatureRecord>,
}

impl From<&Clusters> for SignatureFile {
    fn from(clusters: &Clusters) -> Self {
        let clusters = clusters
            .iter()
            .map(|c| SignatureRecord {
                class_id: c.class_id,
                mean: c.statistics.mean().to_vec(),
                covariance: c
                    .statistics
                    .covariance()
                    .rows()
                    .into_iter()
                    .map(|row| row.to_vec())
                    .collect(),
                pixel_count: c.statistics.pixel_count(),
            })
            .collect();
        Self { clusters }
    }
}

impl SignatureFile {
    fn into_clusters(self) -> Result<Clusters> {
        self.clusters
            .into_iter()
            .map(|r| -> Result<Cluster> {
                let stats = ClusterStatistics::from_rows(r.mean, &r.covariance, r.pixel_count)?;
                Ok(Cluster::new(r.class_id, stats))
            })
            .collect()
    }
}

/// Parse clusters from a JSON string
pub fn clusters_from_json(json: &str) -> Result<Clusters> {
    let file: SignatureFile = serde_json::from_str(json)?;
    file.into_clusters()
}

/// Serialize clusters to a pretty-printed JSON string
pub fn clusters_to_json(clusters: &Clusters) -> Result<String> {
    Ok(serde_json::to_string_pretty(&SignatureFile::from(clusters))?)
}

/// Load clusters from a signature file
pub fn read_signatures<P: AsRef<Path>>(path: P) -> Result<Clusters> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let file: SignatureFile = serde_json::from_reader(reader)?;
    file.into_clusters()
}

/// Save clusters to a signature file
pub fn write_signatures<P: AsRef<Path>>(clusters: &Clusters, path: P) -> Result<()> {
    let writer = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer_pretty(writer, &SignatureFile::from(clusters))?;
    Ok(())
}
