use glam::DVec3;

/// Corners of the unit box centered at the origin, in annotation order.
///
/// The ordering is relied upon by the canonicalization: `v0 - v5` spans the
/// box x axis, `v0 - v2` the y axis and `v0 - v1` the z axis.
pub const UNIT_BOX_VERTICES: [[f64; 3]; 8] = [
    [0.5, 0.5, 0.5],
    [0.5, 0.5, -0.5],
    [0.5, -0.5, 0.5],
    [0.5, -0.5, -0.5],
    [-0.5, 0.5, -0.5],
    [-0.5, 0.5, 0.5],
    [-0.5, -0.5, -0.5],
    [-0.5, -0.5, 0.5],
];

/// Outward facing triangles of [`UNIT_BOX_VERTICES`].
pub const UNIT_BOX_FACES: [[u32; 3]; 12] = [
    [0, 2, 1],
    [1, 2, 3],
    [5, 4, 7],
    [4, 6, 7],
    [0, 1, 5],
    [1, 4, 5],
    [2, 7, 3],
    [3, 7, 6],
    [0, 5, 2],
    [2, 5, 7],
    [1, 3, 4],
    [3, 6, 4],
];

/// The 12 edges of a box for wireframe rendering.
pub const BOX_LINES: [[u32; 2]; 12] = [
    [0, 5],
    [1, 4],
    [2, 7],
    [3, 6],
    [0, 1],
    [1, 3],
    [3, 2],
    [2, 0],
    [4, 5],
    [5, 7],
    [7, 6],
    [6, 4],
];

/// A triangle mesh with per-vertex colors and normals.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// The mesh vertices.
    pub vertices: Vec<[f64; 3]>,
    /// Vertex indices of each triangle.
    pub triangles: Vec<[u32; 3]>,
    /// Per-vertex colors in `[0, 1]`. Empty until painted.
    pub vertex_colors: Vec<[f64; 3]>,
    /// Per-vertex unit normals. Empty until computed.
    pub vertex_normals: Vec<[f64; 3]>,
}

impl TriangleMesh {
    /// Create a mesh from vertices and triangles, without colors or normals.
    pub fn new(vertices: Vec<[f64; 3]>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            triangles,
            vertex_colors: Vec::new(),
            vertex_normals: Vec::new(),
        }
    }

    /// Assign the same color to every vertex.
    pub fn paint_uniform_color(&mut self, color: [f64; 3]) {
        self.vertex_colors = vec![color; self.vertices.len()];
    }

    /// Compute area-weighted vertex normals.
    ///
    /// Each triangle adds its unnormalized face normal, whose length is twice
    /// its area, to its three vertices. The sums are then normalized.
    ///
    /// Triangles referencing vertices out of range and degenerate triangles
    /// are ignored. A vertex without any valid triangle gets a zero normal.
    pub fn compute_vertex_normals(&mut self) {
        let mut accum = vec![DVec3::ZERO; self.vertices.len()];
        for tri in &self.triangles {
            let [a, b, c] = tri.map(|i| i as usize);
            if a >= self.vertices.len() || b >= self.vertices.len() || c >= self.vertices.len() {
                continue;
            }
            let va = DVec3::from_array(self.vertices[a]);
            let vb = DVec3::from_array(self.vertices[b]);
            let vc = DVec3::from_array(self.vertices[c]);
            let normal = (vb - va).cross(vc - va);
            accum[a] += normal;
            accum[b] += normal;
            accum[c] += normal;
        }
        self.vertex_normals = accum
            .into_iter()
            .map(|n| n.normalize_or_zero().to_array())
            .collect();
    }
}

/// A set of colored line segments rendered as cylinders of a given radius.
#[derive(Debug, Clone, Default)]
pub struct LineSet {
    /// The segment end points.
    pub points: Vec<[f64; 3]>,
    /// Point indices of each segment.
    pub lines: Vec<[u32; 2]>,
    /// Per-segment colors in `[0, 1]`.
    pub colors: Vec<[f64; 3]>,
    /// Rendering radius of the segments.
    pub radius: f64,
}

impl LineSet {
    /// Create a line set where every segment has the same color.
    pub fn new(points: Vec<[f64; 3]>, lines: Vec<[u32; 2]>, color: [f64; 3], radius: f64) -> Self {
        let colors = vec![color; lines.len()];
        Self {
            points,
            lines,
            colors,
            radius,
        }
    }

    /// Resolve the segments into pairs of end points, skipping invalid indices.
    pub fn segments(&self) -> Vec<[[f64; 3]; 2]> {
        self.lines
            .iter()
            .filter_map(|[a, b]| {
                let a = self.points.get(*a as usize)?;
                let b = self.points.get(*b as usize)?;
                Some([*a, *b])
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unit_box_axes() {
        let v = UNIT_BOX_VERTICES;
        let sub = |a: [f64; 3], b: [f64; 3]| [a[0] - b[0], a[1] - b[1], a[2] - b[2]];
        assert_eq!(sub(v[0], v[5]), [1.0, 0.0, 0.0]);
        assert_eq!(sub(v[0], v[2]), [0.0, 1.0, 0.0]);
        assert_eq!(sub(v[0], v[1]), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_compute_vertex_normals_points_outward() {
        let mut mesh = TriangleMesh::new(UNIT_BOX_VERTICES.to_vec(), UNIT_BOX_FACES.to_vec());
        mesh.compute_vertex_normals();

        assert_eq!(mesh.vertex_normals.len(), 8);
        for (vertex, normal) in mesh.vertices.iter().zip(&mesh.vertex_normals) {
            // every corner normal leans away from the center
            let dot = vertex[0] * normal[0] + vertex[1] * normal[1] + vertex[2] * normal[2];
            assert!(dot > 0.0);
            let len = (normal[0].powi(2) + normal[1].powi(2) + normal[2].powi(2)).sqrt();
            assert_relative_eq!(len, 1.0, epsilon = 1e-12);
        }

        let inv_sqrt3 = 1.0 / 3f64.sqrt();
        assert_relative_eq!(mesh.vertex_normals[0][0], inv_sqrt3, epsilon = 1e-12);
        assert_relative_eq!(mesh.vertex_normals[0][1], inv_sqrt3, epsilon = 1e-12);
        assert_relative_eq!(mesh.vertex_normals[0][2], inv_sqrt3, epsilon = 1e-12);
    }

    #[test]
    fn test_compute_vertex_normals_area_weighted() {
        // a large triangle facing +z and a small one facing +y share vertex 0
        let mut mesh = TriangleMesh::new(
            vec![
                [0.0, 0.0, 0.0],
                [2.0, 0.0, 0.0],
                [0.0, 2.0, 0.0],
                [0.0, 0.0, 1.0],
                [1.0, 0.0, 0.0],
            ],
            vec![[0, 1, 2], [0, 3, 4]],
        );
        mesh.compute_vertex_normals();

        let norm = 17f64.sqrt();
        assert_relative_eq!(mesh.vertex_normals[0][0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.vertex_normals[0][1], 1.0 / norm, epsilon = 1e-12);
        assert_relative_eq!(mesh.vertex_normals[0][2], 4.0 / norm, epsilon = 1e-12);
        assert_eq!(mesh.vertex_normals[1], [0.0, 0.0, 1.0]);
        assert_eq!(mesh.vertex_normals[3], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_paint_uniform_color() {
        let mut mesh = TriangleMesh::new(UNIT_BOX_VERTICES.to_vec(), UNIT_BOX_FACES.to_vec());
        mesh.paint_uniform_color([0.0, 0.0, 142.0 / 255.0]);
        assert_eq!(mesh.vertex_colors.len(), 8);
        assert!(mesh.vertex_colors.iter().all(|c| *c == [0.0, 0.0, 142.0 / 255.0]));
    }

    #[test]
    fn test_line_set_segments() {
        let lines = LineSet::new(UNIT_BOX_VERTICES.to_vec(), BOX_LINES.to_vec(), [0.0; 3], 0.08);
        let segments = lines.segments();
        assert_eq!(segments.len(), 12);
        assert_eq!(lines.colors.len(), 12);
        assert_eq!(segments[0], [UNIT_BOX_VERTICES[0], UNIT_BOX_VERTICES[5]]);
    }
}
