// Host-side tests for the flat-shaded icosahedron.

use glam::Vec3;
use hero_scene::constants::ICOSAHEDRON_RADIUS;
use hero_scene::core::icosahedron;

#[test]
fn twenty_faces_of_unshared_vertices() {
    assert_eq!(icosahedron(1.0).len(), 60);
}

#[test]
fn vertices_lie_on_the_sphere() {
    for v in icosahedron(ICOSAHEDRON_RADIUS) {
        let len = Vec3::from(v.position).length();
        assert!((len - ICOSAHEDRON_RADIUS).abs() < 1e-5, "len={}", len);
    }
}

#[test]
fn faces_are_flat_outward_and_counter_clockwise() {
    let mesh = icosahedron(2.0);
    for tri in mesh.chunks(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|v| Vec3::from(v.position));
        let n = Vec3::from(tri[0].normal);
        assert!((n.length() - 1.0).abs() < 1e-5);
        assert!(tri.iter().all(|v| v.normal == tri[0].normal));
        assert!(n.dot(a + b + c) > 0.0, "normal points inward");
        assert!((b - a).cross(c - a).dot(n) > 0.0, "clockwise winding");
    }
}

#[test]
fn vertex_layout_is_tightly_packed() {
    assert_eq!(std::mem::size_of::<hero_scene::core::MeshVertex>(), 24);
}
