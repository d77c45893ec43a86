//! Customer segmentation with k-means.
//!
//! Customers of the probability view are clustered on
//! [`FEATURES`]. Clustering is seeded, so the same view always yields the
//! same segments.
//!
//! # Algorithm
//!
//! 1. Pick initial centroids with k-means++ seeding
//! 2. Run Lloyd iterations until no centroid moves more than [`TOLERANCE`]
//!    or [`MAX_ITERATIONS`] is reached
//! 3. Repeat from a fresh seeding [`RESTARTS`] times and keep the run with
//!    the lowest inertia (sum of squared distances to the assigned centroid)
//!
//! Features are clustered on their raw scale.

use churnscope_data::{columns, view::FilteredView};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::frame::{self, AnalysisError};

pub const FEATURES: [&str; 4] = [
    columns::TENURE,
    columns::MONTHLY_CHARGES,
    columns::TOTAL_CHARGES,
    columns::CHURN_PROBABILITY,
];
const DIMS: usize = FEATURES.len();

pub const DEFAULT_CLUSTERS: usize = 4;
pub const RESTARTS: usize = 10;
pub const MAX_ITERATIONS: usize = 300;
pub const TOLERANCE: f64 = 1e-4;
pub const SEED: u64 = 42;

type Point = [f64; DIMS];

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SegmentationError {
    #[display("{_0}")]
    #[from]
    Analysis(#[error(not(source))] AnalysisError),
    #[display("{rows} complete rows are too few for {k} clusters")]
    TooFewRows { rows: usize, k: usize },
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Segment {
    pub cluster: usize,
    pub size: usize,
    /// Mean of each feature, in [`FEATURES`] order.
    pub means: Point,
    /// `means` min-max scaled across segments. A feature whose mean is the
    /// same in every segment scales to zero.
    pub normalized_means: Point,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Segmentation {
    pub features: [&'static str; DIMS],
    pub rows: usize,
    pub inertia: f64,
    pub segments: Vec<Segment>,
}

impl Segmentation {
    /// Clusters the complete rows of the probability view into `k` segments.
    pub fn from_view(view: &FilteredView, k: usize) -> Result<Self, SegmentationError> {
        let columns = FEATURES
            .iter()
            .map(|name| frame::risk_feature(view, name))
            .collect::<Result<Vec<_>, _>>()?;
        let rows = columns.first().map_or(0, Vec::len);
        let points = (0..rows)
            .filter_map(|row| {
                let mut point = [0.0; DIMS];
                for (value, column) in point.iter_mut().zip(&columns) {
                    *value = column[row]?;
                }
                Some(point)
            })
            .collect::<Vec<_>>();
        tracing::debug!(
            rows,
            complete = points.len(),
            "segmentation input prepared"
        );
        Self::from_points(&points, k)
    }

    /// Clusters raw feature vectors.
    pub fn from_points(points: &[Point], k: usize) -> Result<Self, SegmentationError> {
        if k == 0 || points.len() < k {
            return Err(SegmentationError::TooFewRows {
                rows: points.len(),
                k,
            });
        }

        let mut rng = Pcg32::seed_from_u64(SEED);
        let best = (0..RESTARTS)
            .map(|_| lloyd(points, seed_centroids(points, k, &mut rng)))
            .min_by(|a, b| a.inertia.total_cmp(&b.inertia))
            .ok_or(SegmentationError::TooFewRows {
                rows: points.len(),
                k,
            })?;
        tracing::debug!(inertia = best.inertia, "k-means converged");

        let mut segments = (0..k)
            .map(|cluster| {
                let members = best
                    .assignment
                    .iter()
                    .zip(points)
                    .filter(|(c, _)| **c == cluster)
                    .map(|(_, p)| p);
                Segment {
                    cluster,
                    size: 0,
                    means: [0.0; DIMS],
                    normalized_means: [0.0; DIMS],
                }
                .with_members(members)
            })
            .filter(|segment| segment.size > 0)
            .collect::<Vec<_>>();
        normalize(&mut segments);

        Ok(Self {
            features: FEATURES,
            rows: points.len(),
            inertia: best.inertia,
            segments,
        })
    }
}

impl Segment {
    #[expect(clippy::cast_precision_loss)]
    fn with_members<'a, I>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = &'a Point>,
    {
        for point in members {
            self.size += 1;
            for (mean, value) in self.means.iter_mut().zip(point) {
                *mean += value;
            }
        }
        if self.size > 0 {
            for mean in &mut self.means {
                *mean /= self.size as f64;
            }
        }
        self
    }
}

fn normalize(segments: &mut [Segment]) {
    for dim in 0..DIMS {
        let (lo, hi) = segments
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s.means[dim]), hi.max(s.means[dim]))
            });
        let span = hi - lo;
        for segment in segments.iter_mut() {
            segment.normalized_means[dim] = if span > 0.0 {
                (segment.means[dim] - lo) / span
            } else {
                0.0
            };
        }
    }
}

fn distance_sq(a: &Point, b: &Point) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

fn nearest(point: &Point, centroids: &[Point]) -> (usize, f64) {
    centroids
        .iter()
        .map(|c| distance_sq(point, c))
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .unwrap_or((0, 0.0))
}

/// k-means++ seeding: each next centroid is drawn with probability
/// proportional to its squared distance from the closest chosen one.
fn seed_centroids(points: &[Point], k: usize, rng: &mut Pcg32) -> Vec<Point> {
    let mut centroids = vec![points[rng.random_range(0..points.len())]];
    let mut weights = points
        .iter()
        .map(|p| distance_sq(p, &centroids[0]))
        .collect::<Vec<_>>();
    while centroids.len() < k {
        let total = weights.iter().sum::<f64>();
        let next = if total > 0.0 {
            let mut target = rng.random::<f64>() * total;
            weights
                .iter()
                .position(|&w| {
                    target -= w;
                    target < 0.0
                })
                .unwrap_or(points.len() - 1)
        } else {
            // every point coincides with a centroid
            rng.random_range(0..points.len())
        };
        let centroid = points[next];
        for (weight, point) in weights.iter_mut().zip(points) {
            *weight = weight.min(distance_sq(point, &centroid));
        }
        centroids.push(centroid);
    }
    centroids
}

struct Clustering {
    assignment: Vec<usize>,
    inertia: f64,
}

#[expect(clippy::cast_precision_loss)]
fn lloyd(points: &[Point], mut centroids: Vec<Point>) -> Clustering {
    let k = centroids.len();
    let mut assignment = vec![0; points.len()];
    for _ in 0..MAX_ITERATIONS {
        for (slot, point) in assignment.iter_mut().zip(points) {
            *slot = nearest(point, &centroids).0;
        }

        let mut sums = vec![[0.0; DIMS]; k];
        let mut counts = vec![0_usize; k];
        for (&cluster, point) in assignment.iter().zip(points) {
            counts[cluster] += 1;
            for (sum, value) in sums[cluster].iter_mut().zip(point) {
                *sum += value;
            }
        }

        let mut shift = 0.0_f64;
        for ((centroid, sum), &count) in centroids.iter_mut().zip(&sums).zip(&counts) {
            // an emptied cluster keeps its previous centroid
            if count == 0 {
                continue;
            }
            let mut updated = *sum;
            for value in &mut updated {
                *value /= count as f64;
            }
            shift = shift.max(distance_sq(centroid, &updated).sqrt());
            *centroid = updated;
        }
        if shift < TOLERANCE {
            break;
        }
    }

    let mut inertia = 0.0;
    for (slot, point) in assignment.iter_mut().zip(points) {
        let (cluster, dist) = nearest(point, &centroids);
        *slot = cluster;
        inertia += dist;
    }
    Clustering {
        assignment,
        inertia,
    }
}

#[cfg(test)]
mod tests {
    use churnscope_data::{
        table::{Column, Table},
        view::ProbabilityView,
    };

    use super::*;

    /// Four tight, well separated blobs of five points each.
    fn blobs() -> Vec<Point> {
        let centers = [
            [1.0, 20.0, 20.0, 0.9],
            [60.0, 20.0, 1200.0, 0.1],
            [5.0, 100.0, 500.0, 0.7],
            [70.0, 110.0, 7700.0, 0.2],
        ];
        let mut points = vec![];
        for center in centers {
            for i in 0..5 {
                let jitter = f64::from(i) * 0.01;
                points.push(center.map(|v| v + jitter));
            }
        }
        points
    }

    #[test]
    fn test_recovers_separated_blobs() {
        let segmentation = Segmentation::from_points(&blobs(), DEFAULT_CLUSTERS).unwrap();
        assert_eq!(segmentation.segments.len(), 4);
        assert!(segmentation.segments.iter().all(|s| s.size == 5));
        assert!(segmentation.inertia < 1.0);
    }

    #[test]
    fn test_is_deterministic() {
        let a = Segmentation::from_points(&blobs(), DEFAULT_CLUSTERS).unwrap();
        let b = Segmentation::from_points(&blobs(), DEFAULT_CLUSTERS).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_normalized_means_span_unit_interval() {
        let segmentation = Segmentation::from_points(&blobs(), DEFAULT_CLUSTERS).unwrap();
        for dim in 0..DIMS {
            let values = segmentation
                .segments
                .iter()
                .map(|s| s.normalized_means[dim])
                .collect::<Vec<_>>();
            assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));
            assert!(values.iter().any(|v| v.abs() < 1e-12));
            assert!(values.iter().any(|v| (v - 1.0).abs() < 1e-12));
        }
    }

    #[test]
    fn test_constant_feature_normalizes_to_zero() {
        let mut segments = vec![
            Segment {
                cluster: 0,
                size: 1,
                means: [1.0, 5.0, 0.0, 0.0],
                normalized_means: [0.0; DIMS],
            },
            Segment {
                cluster: 1,
                size: 1,
                means: [3.0, 5.0, 0.0, 0.0],
                normalized_means: [0.0; DIMS],
            },
        ];
        normalize(&mut segments);
        assert!((segments[1].normalized_means[0] - 1.0).abs() < 1e-12);
        assert!(segments.iter().all(|s| s.normalized_means[1].abs() < 1e-12));
    }

    #[test]
    fn test_too_few_rows() {
        let err = Segmentation::from_points(&blobs()[..3], DEFAULT_CLUSTERS).unwrap_err();
        assert!(matches!(err, SegmentationError::TooFewRows { rows: 3, k: 4 }));
    }

    #[test]
    fn test_rows_with_missing_features_dropped() {
        let probs = Table::new(vec![
            Column::integer("tenure", [Some(1), Some(2), Some(3), Some(4), Some(5)]),
            Column::float(
                "MonthlyCharges",
                [Some(20.0), Some(30.0), Some(40.0), Some(50.0), Some(60.0)],
            ),
            Column::float(
                "TotalCharges",
                [Some(20.0), None, Some(120.0), Some(200.0), Some(300.0)],
            ),
            Column::float(
                "churn_probability",
                [Some(0.1), Some(0.2), Some(0.3), Some(0.4), Some(0.5)],
            ),
        ]);
        let view = FilteredView {
            customers: probs.clone(),
            probabilities: ProbabilityView::Loaded(probs),
        };
        let segmentation = Segmentation::from_view(&view, DEFAULT_CLUSTERS).unwrap();
        assert_eq!(segmentation.rows, 4);
        assert_eq!(
            segmentation.segments.iter().map(|s| s.size).sum::<usize>(),
            4
        );
    }

    #[test]
    fn test_unavailable_without_probabilities() {
        let view = FilteredView {
            customers: Table::new(vec![]),
            probabilities: ProbabilityView::Absent,
        };
        assert!(matches!(
            Segmentation::from_view(&view, DEFAULT_CLUSTERS),
            Err(SegmentationError::Analysis(
                AnalysisError::ProbabilitiesUnavailable
            ))
        ));
    }
}
