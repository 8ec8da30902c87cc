use crate::{Error, Filter, Point, PointId, Result, Vector};
use ordered_float::OrderedFloat;
use parking_lot::RwLock;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Configuration for a collection
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    pub name: String,
    pub vector_dim: usize,
    pub distance: Distance,
}

impl CollectionConfig {
    /// Directory (relative to the data root) holding this collection on disk
    pub fn directory(&self) -> PathBuf {
        PathBuf::from(&self.name)
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            vector_dim: 256,
            distance: Distance::Cosine,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distance {
    Cosine,
    Euclidean,
    Dot,
}

impl Distance {
    /// Relevance of `point` to `query`: non-negative, higher is a better match.
    ///
    /// Every metric is mapped onto the same direction so ranking and
    /// selection never need to know which metric backs a collection.
    #[inline]
    pub fn relevance(&self, query: &Vector, point: &Vector) -> f32 {
        match self {
            Distance::Cosine => ((1.0 + query.cosine_similarity(point)) / 2.0).clamp(0.0, 1.0),
            Distance::Euclidean => 1.0 / (1.0 + query.l2_distance(point)),
            Distance::Dot => query.dot(point).max(0.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Distance::Cosine => "Cosine",
            Distance::Euclidean => "Euclidean",
            Distance::Dot => "Dot",
        }
    }
}

impl std::str::FromStr for Distance {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Cosine" | "cosine" => Ok(Distance::Cosine),
            "Euclidean" | "euclidean" => Ok(Distance::Euclidean),
            "Dot" | "dot" => Ok(Distance::Dot),
            other => Err(Error::InvalidConfig(format!("unknown distance: {}", other))),
        }
    }
}

#[derive(Default)]
struct Points {
    // Insertion order; ties in ranking resolve to the earlier point
    ordered: Vec<Point>,
    by_id: HashMap<PointId, usize>,
}

/// An append-only, uniquely keyed set of embedded documents
pub struct Collection {
    config: CollectionConfig,
    points: RwLock<Points>,
}

impl Collection {
    pub fn new(config: CollectionConfig) -> Self {
        Self {
            config,
            points: RwLock::new(Points::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    pub fn vector_dim(&self) -> usize {
        self.config.vector_dim
    }

    pub fn distance(&self) -> Distance {
        self.config.distance
    }

    pub fn count(&self) -> usize {
        self.points.read().ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    fn check(&self, point: &Point) -> Result<()> {
        if point.vector.dim() != self.config.vector_dim {
            return Err(Error::InvalidDimension {
                expected: self.config.vector_dim,
                actual: point.vector.dim(),
            });
        }
        Ok(())
    }

    /// Insert a new point. Ids are never overwritten.
    pub fn insert(&self, point: Point) -> Result<()> {
        self.insert_batch(vec![point])
    }

    /// Insert a batch of points.
    ///
    /// The whole batch is validated first, so a rejected batch leaves the
    /// collection untouched; earlier batches are unaffected either way.
    pub fn insert_batch(&self, batch: Vec<Point>) -> Result<()> {
        let mut points = self.points.write();

        let mut seen = HashSet::with_capacity(batch.len());
        for point in &batch {
            self.check(point)?;
            if points.by_id.contains_key(&point.id) || !seen.insert(&point.id) {
                return Err(Error::PointExists(point.id.to_string()));
            }
        }
        drop(seen);

        for point in batch {
            let idx = points.ordered.len();
            points.by_id.insert(point.id.clone(), idx);
            points.ordered.push(point);
        }
        Ok(())
    }

    /// Get a point by ID
    pub fn get(&self, id: &PointId) -> Option<Point> {
        let points = self.points.read();
        points.by_id.get(id).map(|&idx| points.ordered[idx].clone())
    }

    pub fn contains(&self, id: &PointId) -> bool {
        self.points.read().by_id.contains_key(id)
    }

    /// Search for the `limit` most relevant points.
    ///
    /// The filter is applied before ranking, so it never shrinks the result
    /// below `limit` when enough matching points exist. Scores are
    /// relevances (higher is better), see [`Distance::relevance`].
    pub fn search(
        &self,
        query: &Vector,
        limit: usize,
        filter: Option<&dyn Filter>,
    ) -> Vec<(Point, f32)> {
        if limit == 0 {
            return Vec::new();
        }

        let points = self.points.read();
        let distance = self.config.distance;

        let mut scored: Vec<(usize, f32)> = points
            .ordered
            .par_iter()
            .enumerate()
            .filter(|(_, point)| filter.map(|f| f.matches(point)).unwrap_or(true))
            .map(|(idx, point)| (idx, distance.relevance(query, &point.vector)))
            .collect();

        // Stable sort keeps first-seen order among equal scores
        scored.sort_by_key(|&(_, score)| std::cmp::Reverse(OrderedFloat(score)));
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(idx, score)| (points.ordered[idx].clone(), score))
            .collect()
    }

    /// Snapshot of all points in insertion order
    pub fn iter(&self) -> Vec<Point> {
        self.points.read().ordered.clone()
    }
}
