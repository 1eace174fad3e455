//! End-to-end runs of the partition / triangulate / merge pipeline.

use pangraph::{is_delaunay_par, merge_and_triangulate, partition, Point};
use rand::{distributions::Uniform, prelude::Distribution};
use rand_distr::Normal;
use std::collections::HashSet;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn sample_uniform(n: usize, lo: f64, hi: f64) -> Vec<Point> {
    let mut rng = rand::thread_rng();
    let uniform = Uniform::from(lo..=hi);

    (0..n)
        .map(|_| Point::new(uniform.sample(&mut rng), uniform.sample(&mut rng)))
        .collect()
}

#[test]
fn large_uniform_point_set_partitions_and_merges() {
    init_logging();

    let points = sample_uniform(20_000, 0.0, 100.0);
    let regions = partition(&points, 5_000).unwrap();
    assert!(regions.len() >= 4, "only {} regions", regions.len());

    let graph = merge_and_triangulate(regions).unwrap();

    let vertices: HashSet<Point> = graph.vertices().map(|(_, v)| v.point()).collect();
    for p in &points {
        assert!(vertices.contains(p), "point {p} missing after merge");
    }
    assert!(graph.check_soundness());
    assert_eq!(is_delaunay_par(&graph), 1.0);
}

#[test]
fn clustered_point_set_survives_unbalanced_partitioning() {
    init_logging();

    // Two dense clusters plus uniform background noise; the quadtree ends up
    // deeply unbalanced and most seams run through the clusters.
    let mut rng = rand::thread_rng();
    let cluster_a = Normal::new(20.0, 1.5).unwrap();
    let cluster_b = Normal::new(80.0, 1.5).unwrap();

    let mut points: Vec<Point> = Vec::new();
    for _ in 0..1_000 {
        points.push(Point::new(
            cluster_a.sample(&mut rng),
            cluster_a.sample(&mut rng),
        ));
        points.push(Point::new(
            cluster_b.sample(&mut rng),
            cluster_b.sample(&mut rng),
        ));
    }
    points.extend(sample_uniform(500, 0.0, 100.0));

    let regions = partition(&points, 200).unwrap();
    let graph = merge_and_triangulate(regions).unwrap();

    assert!(graph.check_soundness());
    assert_eq!(is_delaunay_par(&graph), 1.0);
}
