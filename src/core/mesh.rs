use glam::Vec3;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Flat-shaded icosahedron (detail 0): 20 faces, 3 unshared vertices each,
/// so every vertex carries its face normal. Counter-clockwise winding seen
/// from outside.
pub fn icosahedron(radius: f32) -> Vec<MeshVertex> {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let corners = [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
    .map(|c| c.normalize() * radius);

    let mut out = Vec::with_capacity(ICOSAHEDRON_FACES.len() * 3);
    for [a, b, c] in ICOSAHEDRON_FACES {
        let (pa, pb, pc) = (corners[a], corners[b], corners[c]);
        let mut normal = (pb - pa).cross(pc - pa).normalize();
        // keep normals pointing away from the centre regardless of table order
        if normal.dot(pa + pb + pc) < 0.0 {
            normal = -normal;
            for p in [pa, pc, pb] {
                out.push(MeshVertex {
                    position: p.to_array(),
                    normal: normal.to_array(),
                });
            }
            continue;
        }
        for p in [pa, pb, pc] {
            out.push(MeshVertex {
                position: p.to_array(),
                normal: normal.to_array(),
            });
        }
    }
    out
}
