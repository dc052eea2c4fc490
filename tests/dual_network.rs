//! End-to-end tests for the Delaunay-Voronoi dual network.
//!
//! Covers the hand-checked planar and spatial configurations, the structural
//! properties every built network must satisfy, and the public error paths.

#![forbid(unsafe_code)]

use approx::assert_relative_eq;
use delaunay_voronoi_dual::prelude::*;

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

// =============================================================================
// HELPERS
// =============================================================================

fn diamond() -> DelaunayVoronoiDual {
    DelaunayVoronoiDual::from_points(
        &[1.0, 1.0, 0.0],
        vec![[0.5, 0.5], [1.5, 0.5], [0.5, 1.5], [-0.5, 0.5], [0.5, -0.5]],
    )
    .unwrap()
}

fn octahedron() -> DelaunayVoronoiDual {
    DelaunayVoronoiDual::from_points(
        &[1.0, 1.0, 1.0],
        vec![
            [0.5, 0.5, 0.5],
            [1.5, 0.5, 0.5],
            [0.5, 1.5, 0.5],
            [-0.5, 0.5, 0.5],
            [0.5, -0.5, 0.5],
            [0.5, 0.5, 1.5],
            [0.5, 0.5, -0.5],
        ],
    )
    .unwrap()
}

fn generated(shape: &[f64], num_points: usize, seed: u64) -> DelaunayVoronoiDual {
    DelaunayVoronoiDual::builder()
        .shape(shape.to_vec())
        .num_points(num_points)
        .seed(seed)
        .build_network()
        .unwrap()
}

fn mask(net: &Network, label: PoreLabel) -> Vec<bool> {
    (0..net.num_pores())
        .map(|p| net.labels().pore_has(label, p))
        .collect()
}

/// Structural properties every trimmed dual network must satisfy.
fn assert_dual_invariants(dual: &DelaunayVoronoiDual) {
    let net = dual.network();
    net.check_integrity().unwrap();

    let delaunay = mask(net, PoreLabel::Delaunay);
    let voronoi = mask(net, PoreLabel::Voronoi);
    let surface = mask(net, PoreLabel::Surface);
    let internal = mask(net, PoreLabel::Internal);
    for p in 0..net.num_pores() {
        assert!(delaunay[p] ^ voronoi[p], "pore {p} class");
        assert!(surface[p] ^ internal[p], "pore {p} surface/internal");
    }

    for (t, edge) in net.conns().iter().enumerate() {
        let labels = net.labels();
        let classes = [
            ThroatLabel::Delaunay,
            ThroatLabel::Voronoi,
            ThroatLabel::Interconnect,
        ]
        .into_iter()
        .filter(|&l| labels.throat_has(l, t))
        .count();
        assert_eq!(classes, 1, "throat {t} class labels");

        let expected = EdgeCategory::from_endpoint_classes(delaunay[edge.v0()], delaunay[edge.v1()]);
        assert_eq!(dual.throat_category(t), Some(expected));
        let label = match expected {
            EdgeCategory::Delaunay => ThroatLabel::Delaunay,
            EdgeCategory::Voronoi => ThroatLabel::Voronoi,
            EdgeCategory::Interconnect => ThroatLabel::Interconnect,
        };
        assert!(labels.throat_has(label, t));

        assert!(
            !(labels.throat_has(ThroatLabel::Surface, t)
                && labels.throat_has(ThroatLabel::Internal, t))
        );
        if labels.throat_has(ThroatLabel::Surface, t) {
            assert!(surface[edge.v0()] && surface[edge.v1()]);
        }
        if labels.throat_has(ThroatLabel::Internal, t) {
            assert!(internal[edge.v0()] && internal[edge.v1()]);
        }
        // Hull Delaunay throats between surface pores are gone.
        if expected == EdgeCategory::Delaunay {
            assert!(!(surface[edge.v0()] && surface[edge.v1()]), "throat {t}");
        }
    }

    let index = net.adjacency().unwrap();
    for p in (0..net.num_pores()).filter(|&p| delaunay[p] && surface[p]) {
        let neighbors: Vec<[f64; 3]> = index
            .neighbors(p)
            .iter()
            .filter(|&&q| voronoi[q])
            .map(|&q| net.coords()[q])
            .collect();
        if neighbors.is_empty() {
            continue;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = neighbors.len() as f64;
        for axis in 0..3 {
            let mean = neighbors.iter().map(|c| c[axis]).sum::<f64>() / n;
            assert_relative_eq!(net.coords()[p][axis], mean, epsilon = 1e-9);
        }
    }

    let interconnect = net.adjacency_for(ThroatLabel::Interconnect).unwrap();
    let facets = dual.find_throat_facets(None).unwrap();
    for (&t, facet) in net.throats(ThroatLabel::Delaunay).iter().zip(&facets) {
        let (a, b) = net.conns()[t].endpoints();
        for v in facet {
            assert!(voronoi[*v]);
            assert!(interconnect.neighbors(a).contains(v));
            assert!(interconnect.neighbors(b).contains(v));
        }
        assert_eq!(facet.is_empty(), interconnect.common_neighbors(a, b).is_empty());
    }

    let hulls = dual.find_pore_hulls(None).unwrap();
    for (&p, hull) in net.pores(PoreLabel::Delaunay).iter().zip(&hulls) {
        assert_eq!(hull.as_slice(), interconnect.neighbors(p));
    }
}

// =============================================================================
// HAND-CHECKED CONFIGURATIONS
// =============================================================================

#[test]
fn planar_diamond_matches_hand_computed_network() {
    init_tracing();
    let dual = diamond();
    let net = dual.network();

    assert_eq!(dual.tessellation().dim(), 2);
    assert_eq!(dual.simplices().len(), 4);
    assert_eq!(net.num_pores(), 9);
    assert_eq!(net.num_throats(), 20);
    assert_eq!(net.pores(PoreLabel::Internal), vec![0]);
    assert_eq!(net.throats(ThroatLabel::Surface).len(), 12);
    assert!(net.throats(ThroatLabel::Internal).is_empty());

    let relocated = [[1.0, 0.5], [0.5, 1.0], [0.0, 0.5], [0.5, 0.0]];
    for (p, expected) in (1..5).zip(relocated) {
        assert_relative_eq!(net.coords()[p][0], expected[0]);
        assert_relative_eq!(net.coords()[p][1], expected[1]);
        assert_eq!(net.coords()[p][2], 0.0);
    }

    let hulls = dual.find_pore_hulls(Some(&[0])).unwrap();
    assert_eq!(hulls[0].len(), 4);
    assert_dual_invariants(&dual);
}

#[test]
fn planar_diamond_from_spatial_points_with_constant_z() {
    let spatial = DelaunayVoronoiDual::from_points(
        &[1.0, 1.0, 0.0],
        vec![
            [0.5, 0.5, 0.0],
            [1.5, 0.5, 0.0],
            [0.5, 1.5, 0.0],
            [-0.5, 0.5, 0.0],
            [0.5, -0.5, 0.0],
        ],
    )
    .unwrap();
    assert_eq!(spatial.tessellation().dim(), 2);
    assert_eq!(spatial.network(), diamond().network());
}

#[test]
fn octahedron_matches_hand_computed_network() {
    init_tracing();
    let dual = octahedron();
    let net = dual.network();

    assert_eq!(dual.simplices().len(), 8);
    assert_eq!(dual.tessellation().vertices().len(), 8);
    assert_eq!(net.num_pores(), 15);
    assert_eq!(dual.trim_report().surface_throats_removed, 12);
    assert_eq!(net.num_throats(), 50);
    assert_eq!(net.throats(ThroatLabel::Delaunay).len(), 6);
    assert_eq!(net.throats(ThroatLabel::Interconnect).len(), 32);
    assert_eq!(net.throats(ThroatLabel::Voronoi).len(), 12);

    let x = net.coords()[1];
    assert_relative_eq!(x[0], 1.0);
    assert_relative_eq!(x[1], 0.5);
    assert_relative_eq!(x[2], 0.5);

    // Each Delaunay throat from the center crosses a square cube face.
    let facets = dual.find_throat_facets(None).unwrap();
    assert!(facets.iter().all(|f| f.len() == 4));
    assert_eq!(dual.find_pore_hulls(Some(&[0])).unwrap()[0].len(), 8);
    assert_dual_invariants(&dual);
}

// =============================================================================
// GENERATED NETWORKS
// =============================================================================

#[test]
fn generated_planar_network_invariants() {
    init_tracing();
    let dual = generated(&[1.0, 1.0, 0.0], 60, 42);
    assert_eq!(dual.tessellation().dim(), 2);
    assert_eq!(dual.tessellation().npoints(), 300);
    assert!(dual.network().pores(PoreLabel::Internal).len() >= 60);
    assert!(dual.trim_report().isolated_surface_pores.is_empty());
    assert_dual_invariants(&dual);

    // Interior Delaunay pores have a closed Voronoi cell.
    let net = dual.network();
    let internal = mask(net, PoreLabel::Internal);
    let hulls = dual.find_pore_hulls(None).unwrap();
    for (&p, hull) in net.pores(PoreLabel::Delaunay).iter().zip(&hulls) {
        if internal[p] {
            assert!(hull.len() >= 3, "pore {p}");
        }
    }
}

#[test]
fn generated_spatial_network_invariants() {
    init_tracing();
    let dual = generated(&[1.0, 2.0, 1.0], 25, 7);
    assert_eq!(dual.tessellation().dim(), 3);
    assert_eq!(dual.tessellation().npoints(), 25 * 7);
    let domain = dual.domain();
    for p in dual.network().pores(PoreLabel::Internal) {
        if dual.network().labels().pore_has(PoreLabel::Delaunay, p) {
            assert!(!domain.is_outside(&dual.network().coords()[p]));
        }
    }
    assert_dual_invariants(&dual);
}

#[test]
fn inactive_middle_axis_builds_a_planar_network() {
    init_tracing();
    let slab = generated(&[1.0, 0.0, 1.0], 40, 3);
    let flat = generated(&[1.0, 1.0, 0.0], 40, 3);
    assert_eq!(slab.tessellation().dim(), 2);
    assert_eq!(slab.tessellation(), flat.tessellation());

    let (a, b) = (slab.network(), flat.network());
    assert_eq!(a.conns(), b.conns());
    assert_eq!(a.labels(), b.labels());
    for (p, q) in a.coords().iter().zip(b.coords()) {
        assert_eq!(*p, [q[0], 0.0, q[1]]);
    }
    assert_dual_invariants(&slab);
}

#[test]
fn construction_is_deterministic_for_a_seed() {
    let a = generated(&[1.0, 1.0, 0.0], 40, 3);
    let b = generated(&[1.0, 1.0, 0.0], 40, 3);
    assert_eq!(a.network(), b.network());
    assert_eq!(a.tessellation(), b.tessellation());
}

#[test]
fn trimming_is_idempotent() {
    let mut dual = generated(&[1.0, 1.0, 0.0], 50, 11);
    let before = dual.network().clone();
    let report = dual.trim_external_pores().unwrap();
    assert_eq!(report.pores_removed, 0);
    assert_eq!(report.throats_removed, 0);
    assert_eq!(report.surface_throats_removed, 0);
    assert_eq!(report.relocated, 0);
    assert_eq!(dual.network().coords(), before.coords());
    assert_eq!(dual.network().conns(), before.conns());
    for label in [PoreLabel::Surface, PoreLabel::Internal] {
        assert_eq!(dual.network().pores(label), before.pores(label), "{label}");
    }
    for label in [ThroatLabel::Surface, ThroatLabel::Internal] {
        assert_eq!(dual.network().throats(label), before.throats(label), "{label}");
    }
    assert!(!dual.network().pores(PoreLabel::Surface).is_empty());
    assert_dual_invariants(&dual);
}

#[test]
fn boundary_pores_extend_the_surface() {
    let mut dual = diamond();
    let clones = dual
        .add_boundary_pores(PoreLabel::Surface, [0.0, 0.0, 1.0])
        .unwrap();
    let net = dual.network();
    assert_eq!(clones.len(), 8);
    for &c in &clones {
        assert!(net.labels().pore_has(PoreLabel::Boundary, c));
        assert_eq!(net.coords()[c][2], 1.0);
    }
    net.check_integrity().unwrap();
}

// =============================================================================
// ERRORS & SERIALIZATION
// =============================================================================

#[test]
fn missing_points_fails_before_construction() {
    let err = DelaunayVoronoiDual::builder()
        .shape([1.0, 1.0, 1.0])
        .build_network()
        .unwrap_err();
    assert!(matches!(err, DualNetworkError::Config(_)));
    assert!(err.to_string().contains("num_points"));
}

#[test]
fn duplicate_points_are_reported() {
    let err = DelaunayVoronoiDual::from_points(
        &[1.0, 1.0, 0.0],
        vec![[0.2, 0.2], [0.8, 0.2], [0.5, 0.9], [0.8, 0.2]],
    )
    .unwrap_err();
    assert!(matches!(
        err,
        DualNetworkError::Tessellation(TessellationError::DuplicatePoint {
            index: 3,
            existing: 1
        })
    ));
}

#[test]
fn collinear_points_are_degenerate() {
    let err = DelaunayVoronoiDual::from_points(
        &[1.0, 1.0, 0.0],
        vec![[0.1, 0.1], [0.2, 0.2], [0.3, 0.3], [0.4, 0.4]],
    )
    .unwrap_err();
    assert!(matches!(
        err,
        DualNetworkError::Tessellation(TessellationError::DegenerateInput { .. })
    ));
}

#[test]
fn invalid_shape_is_rejected() {
    let config = DualConfig {
        shape: vec![1.0, -2.0],
        points: None,
        num_points: Some(10),
        seed: None,
    };
    assert!(matches!(
        DelaunayVoronoiDual::new(&config),
        Err(DualNetworkError::Config(_))
    ));
}

#[test]
fn network_serde_round_trip() {
    let network = diamond().into_network();
    let json = serde_json::to_string(&network).unwrap();
    let back: Network = serde_json::from_str(&json).unwrap();
    assert_eq!(back, network);
    back.check_integrity().unwrap();
}

#[test]
fn corrupted_network_document_is_rejected() {
    let network = diamond().into_network();
    let mut doc = serde_json::to_value(&network).unwrap();
    doc["conns"][0]["v1"] = serde_json::json!(99);
    assert!(serde_json::from_value::<Network>(doc).is_err());

    let mut doc = serde_json::to_value(&network).unwrap();
    doc["coords"].as_array_mut().unwrap().pop();
    assert!(serde_json::from_value::<Network>(doc).is_err());
}
