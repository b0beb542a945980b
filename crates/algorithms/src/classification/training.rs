//! Cluster statistics from labelled training pixels

use std::collections::BTreeMap;

use geoclass_core::{Cluster, ClusterStatistics, Clusters, Error, Raster, RasterElement, Result};

/// Label marking unlabelled training pixels
pub const UNLABELLED: i32 = 0;

/// Build one cluster per training label.
///
/// `labels` holds a class id per pixel; `0` and the label raster's no-data
/// value mark pixels outside the training set. A labelled pixel is sampled
/// only if every band value is finite and not that band's no-data value.
/// Labels with fewer than two samples are skipped (no covariance can be
/// estimated from them). Clusters are ordered by class id.
pub fn clusters_from_training<T: RasterElement>(
    labels: &Raster<i32>,
    bands: &[&Raster<T>],
) -> Result<Clusters> {
    if bands.is_empty() {
        return Err(Error::InvalidParameter {
            name: "bands",
            value: "0".to_string(),
            reason: "at least one band is required".to_string(),
        });
    }
    let (rows, cols) = labels.shape();
    for band in bands {
        if band.shape() != (rows, cols) {
            return Err(Error::SizeMismatch {
                er: rows,
                ec: cols,
                ar: band.rows(),
                ac: band.cols(),
            });
        }
    }

    let mut samples: BTreeMap<i32, Vec<Vec<f64>>> = BTreeMap::new();
    let mut pixel = Vec::with_capacity(bands.len());

    for r in 0..rows {
        for c in 0..cols {
            let label = unsafe { labels.get_unchecked(r, c) };
            if label == UNLABELLED || labels.is_nodata(label) {
                continue;
            }
            pixel.clear();
            for band in bands {
                let value = unsafe { band.get_unchecked(r, c) };
                if band.is_nodata(value) || !value.to_f64().is_finite() {
                    break;
                }
                pixel.push(value.to_f64());
            }
            if pixel.len() == bands.len() {
                samples.entry(label).or_default().push(pixel.clone());
            }
        }
    }

    let mut clusters = Clusters::new();
    for (class_id, class_samples) in samples {
        if class_samples.len() < 2 {
            tracing::warn!(class_id, samples = class_samples.len(), "too few training pixels, class skipped");
            continue;
        }
        let statistics = ClusterStatistics::from_samples(&class_samples)?;
        tracing::debug!(class_id, pixels = statistics.pixel_count(), "training cluster");
        clusters.push(Cluster::new(class_id, statistics));
    }
    Ok(clusters)
}
