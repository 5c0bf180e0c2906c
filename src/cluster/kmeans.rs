//! Centroid clustering in OKLCh.
//!
//! Seeding is farthest-point: one sample at random, then repeatedly the
//! sample whose nearest chosen centroid is farthest away. A fixed number of
//! assign/update rounds follows; hue is averaged on the circle.
//!
//! The random source is injected so a fixed seed gives repeatable output.

use rand::Rng;

use crate::candidate::{ColorCandidate, Source};
use crate::oklch::{self, Lch};

/// A centroid with no sample closer than this is dropped after iterating.
pub const PRUNE_RADIUS: f32 = 0.1;

/// Pick up to `k` initial centroids from `points`.
pub fn seed_centroids<R>(points: &[Lch], k: usize, rng: &mut R) -> Vec<Lch>
where
    R: Rng + ?Sized,
{
    if points.is_empty() || k == 0 {
        return Vec::new();
    }
    let k = k.min(points.len());

    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.random_range(0..points.len())]);

    // Running minimum distance from every point to the chosen set
    let mut nearest: Vec<f32> = points.iter().map(|p| oklch::distance(p, &centroids[0])).collect();

    while centroids.len() < k {
        let mut farthest = 0usize;
        let mut max_dist = f32::NEG_INFINITY;
        for (i, &d) in nearest.iter().enumerate() {
            if d > max_dist {
                max_dist = d;
                farthest = i;
            }
        }
        let chosen = points[farthest];
        centroids.push(chosen);
        for (d, p) in nearest.iter_mut().zip(points) {
            *d = d.min(oklch::distance(p, &chosen));
        }
    }

    centroids
}

/// Index of the centroid closest to `point`; ties go to the lower index.
fn nearest_centroid(point: &Lch, centroids: &[Lch]) -> usize {
    let mut best = 0usize;
    let mut best_dist = f32::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = oklch::distance(point, c);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Run k-means and return the surviving centroids as candidates.
pub fn kmeans<R>(points: &[Lch], k: usize, iterations: usize, rng: &mut R) -> Vec<ColorCandidate>
where
    R: Rng + ?Sized,
{
    let mut centroids = seed_centroids(points, k, rng);
    if centroids.is_empty() {
        return Vec::new();
    }

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); centroids.len()];
    for _ in 0..iterations {
        members.iter_mut().for_each(Vec::clear);
        for (i, p) in points.iter().enumerate() {
            members[nearest_centroid(p, &centroids)].push(i);
        }

        for (centroid, assigned) in centroids.iter_mut().zip(&members) {
            // Empty clusters keep their previous position
            if let Some(mean) = oklch::mean_lch(assigned.iter().map(|&i| &points[i])) {
                *centroid = mean;
            }
        }
    }

    centroids
        .into_iter()
        .filter(|c| points.iter().any(|p| oklch::distance(p, c) < PRUNE_RADIUS))
        .map(|c| ColorCandidate::new(c, Source::KMeans))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn blobs() -> Vec<Lch> {
        let mut pts = Vec::new();
        for i in 0..20 {
            let jitter = i as f32 * 0.001;
            pts.push(Lch::new(0.3 + jitter, 0.15, 30.0));
            pts.push(Lch::new(0.7 + jitter, 0.10, 150.0));
            pts.push(Lch::new(0.5 + jitter, 0.25, 270.0));
        }
        pts
    }

    #[test]
    fn empty_input_gives_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(kmeans(&[], 16, 8, &mut rng).is_empty());
        assert!(seed_centroids(&[], 4, &mut rng).is_empty());
    }

    #[test]
    fn k_is_capped_by_sample_count() {
        let pts = [Lch::new(0.5, 0.1, 10.0), Lch::new(0.6, 0.2, 200.0)];
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(seed_centroids(&pts, 16, &mut rng).len(), 2);
    }

    #[test]
    fn seeding_spreads_out() {
        let pts = blobs();
        let mut rng = StdRng::seed_from_u64(42);
        let seeds = seed_centroids(&pts, 3, &mut rng);
        // Farthest-point seeding lands one seed in each blob
        for i in 0..3 {
            for j in (i + 1)..3 {
                assert!(oklch::distance(&seeds[i], &seeds[j]) > 0.15);
            }
        }
    }

    #[test]
    fn recovers_three_blobs() {
        let pts = blobs();
        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = kmeans(&pts, 3, 8, &mut rng);
            assert_eq!(out.len(), 3, "seed {seed}");
            assert!(out.iter().all(|c| c.source == Source::KMeans));
            let mut hues: Vec<f32> = out.iter().map(|c| c.oklch.h).collect();
            hues.sort_by(f32::total_cmp);
            assert!((hues[0] - 30.0).abs() < 1.0);
            assert!((hues[1] - 150.0).abs() < 1.0);
            assert!((hues[2] - 270.0).abs() < 1.0);
        }
    }

    #[test]
    fn same_seed_same_result() {
        let pts = blobs();
        let a = kmeans(&pts, 16, 8, &mut StdRng::seed_from_u64(9));
        let b = kmeans(&pts, 16, 8, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn hue_averaged_across_seam() {
        let pts = [Lch::new(0.5, 0.2, 355.0), Lch::new(0.5, 0.2, 5.0)];
        let mut rng = StdRng::seed_from_u64(0);
        let out = kmeans(&pts, 1, 4, &mut rng);
        assert_eq!(out.len(), 1);
        assert!(oklch::hue_delta(out[0].oklch.h, 0.0) < 1e-3, "hue {}", out[0].oklch.h);
    }

    #[test]
    fn every_centroid_has_a_nearby_sample() {
        let pts = blobs();
        let out = kmeans(&pts, 16, 8, &mut StdRng::seed_from_u64(5));
        for c in &out {
            assert!(pts.iter().any(|p| oklch::distance(p, &c.oklch) < PRUNE_RADIUS));
        }
    }
}
