use pretty_assertions::assert_eq;
use termglobe::globe::hit::{find_hovered_location, MarkerProjection, HIT_THRESHOLD};
use termglobe::globe::input::{PointerInput, PointerPhase};
use termglobe::globe::projection::{lifted_arc_point, project, Geometry, Vec3};
use termglobe::globe::render::project_markers;
use termglobe::globe::scene::connection_arcs;
use termglobe::globe::view::{PanState, RenderMode, RotationState, ViewState};
use termglobe::landmass::Landmass;
use termglobe::location::{load_locations, parse_locations};
use termglobe::mount::Mount;
use termglobe::{Globe, GlobeOptions};

fn globe(options: GlobeOptions) -> Globe {
    Globe::mount(
        Mount::new(0, 0, 80, 24),
        load_locations(None).unwrap(),
        Landmass::load(None).unwrap(),
        GlobeOptions {
            seed: Some(42),
            ..options
        },
    )
    .unwrap()
}

fn rotation_y(globe: &Globe) -> f64 {
    match globe.view() {
        ViewState::Sphere(rot) => rot.rotation_y,
        ViewState::Flat(_) => panic!("expected sphere mode"),
    }
}

/// Ten 10-dot moves, 10ms apart, then release and coast to rest.
fn drag_and_settle(globe: &mut Globe, direction: f64, t0: f64) -> f64 {
    let (x0, y) = (80.0 - direction * 50.0, 48.0);
    globe.handle_pointer(PointerInput::mouse(PointerPhase::Down, x0, y), t0);
    let mut t = t0;
    for step in 1..=10 {
        t += 10.0;
        let x = x0 + direction * 10.0 * step as f64;
        globe.handle_pointer(PointerInput::mouse(PointerPhase::Move, x, y), t);
    }
    globe.handle_pointer(PointerInput::mouse(PointerPhase::Up, x0 + direction * 100.0, y), t);
    assert!(globe.view().velocity() != 0.0);

    for _ in 0..5000 {
        if globe.view().velocity() == 0.0 {
            break;
        }
        globe.tick();
    }
    assert_eq!(globe.view().velocity(), 0.0);
    t
}

#[test]
fn drag_right_spins_positive_and_symmetric_drag_returns() {
    let mut g = globe(GlobeOptions {
        auto_rotate: false,
        start_rotation_y: 0.0,
        ..GlobeOptions::default()
    });

    let t = drag_and_settle(&mut g, 1.0, 0.0);
    let after_right = rotation_y(&g);
    assert!(after_right > 0.0, "rotation after right drag: {}", after_right);

    drag_and_settle(&mut g, -1.0, t + 1000.0);
    assert!(rotation_y(&g).abs() < 1e-9, "net rotation: {}", rotation_y(&g));
}

#[test]
fn arcs_start_at_the_primary_location() {
    let locations = parse_locations(
        r#"[
            {"country": "Home", "lat": 10.0, "lng": 20.0},
            {"country": "Away", "lat": -30.0, "lng": 140.0},
            {"country": "Far", "lat": 50.0, "lng": -60.0}
        ]"#,
    )
    .unwrap();
    let arcs = connection_arcs(&locations);
    assert_eq!(arcs.len(), 2);
    assert!(arcs.iter().all(|arc| arc.from == 0));
    assert_eq!(arcs.iter().map(|arc| arc.to).collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn flat_markers_repeat_every_map_width() {
    let locations = load_locations(None).unwrap();
    let geometry = Geometry::new(400.0, 96.0);
    let at = |pan_offset_x| {
        let view = ViewState::Flat(PanState {
            pan_offset_x,
            velocity: 0.0,
        });
        project_markers(&locations, &view, &geometry)
    };

    let base = at(0.0);
    let wrapped = at(geometry.map_width);
    assert_eq!(base.len(), wrapped.len());
    for (a, b) in base.iter().zip(&wrapped) {
        assert_eq!(a.location, b.location);
        assert!((a.screen_x - b.screen_x).abs() < 1e-9);
        assert!((a.screen_y - b.screen_y).abs() < 1e-9);
        assert!(b.visible);
    }
}

#[test]
fn reduced_motion_frames_do_not_drift() {
    let mut g = globe(GlobeOptions {
        reduced_motion: true,
        ..GlobeOptions::default()
    });
    assert!(!g.tick());
    let first = g.markers().to_vec();
    g.render();
    assert_eq!(g.markers(), first.as_slice());
    assert!(!g.tick());
    g.render();
    assert_eq!(g.markers(), first.as_slice());
    assert_eq!(g.entry_progress(), 1.0);
}

#[test]
fn hover_needs_to_be_strictly_inside_threshold() {
    let markers = [
        MarkerProjection {
            screen_x: 50.0,
            screen_y: 50.0,
            visible: true,
            location: 0,
        },
        MarkerProjection {
            screen_x: 90.0,
            screen_y: 50.0,
            visible: false,
            location: 1,
        },
    ];
    assert_eq!(find_hovered_location(50.0 + 17.9, 50.0, &markers, HIT_THRESHOLD), Some(0));
    assert_eq!(find_hovered_location(50.0 + HIT_THRESHOLD, 50.0, &markers, HIT_THRESHOLD), None);
    // hidden markers never match, however close
    assert_eq!(find_hovered_location(90.0, 50.0, &markers, HIT_THRESHOLD), None);
}

#[test]
fn arc_endpoints_match_marker_projections() {
    let locations = load_locations(None).unwrap();
    let geometry = Geometry::new(160.0, 96.0);
    let rotation = RotationState {
        rotation_y: 0.7,
        rotation_x: 0.2,
        angular_velocity: 0.0,
    };
    let view = ViewState::Sphere(rotation);

    for arc in connection_arcs(&locations) {
        let (from_lat, from_lng) = locations[arc.from].radians();
        let (to_lat, to_lng) = locations[arc.to].radians();
        let a = Vec3::from_lat_lng(from_lat, from_lng);
        let b = Vec3::from_lat_lng(to_lat, to_lng);

        let start = lifted_arc_point(a, b, 0.0, arc.lift, &rotation, &geometry);
        let end = lifted_arc_point(a, b, 1.0, arc.lift, &rotation, &geometry);
        let from = project(from_lat, from_lng, &view, &geometry);
        let to = project(to_lat, to_lng, &view, &geometry);

        assert!((start.x - from.x).abs() < 1e-9 && (start.y - from.y).abs() < 1e-9);
        assert!((end.x - to.x).abs() < 1e-9 && (end.y - to.y).abs() < 1e-9);
    }
    assert_eq!(RenderMode::Sphere, view.mode());
}
