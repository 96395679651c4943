use glam::DVec3;

/// A point cloud with points, colors, and normals.
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    // The points in the point cloud.
    points: Vec<[f64; 3]>,
    // The colors of the points.
    colors: Option<Vec<[u8; 3]>>,
    // The normals of the points.
    normals: Option<Vec<[f64; 3]>>,
}

impl PointCloud {
    /// Create a new point cloud from points, colors (optional), and normals (optional).
    pub fn new(
        points: Vec<[f64; 3]>,
        colors: Option<Vec<[u8; 3]>>,
        normals: Option<Vec<[f64; 3]>>,
    ) -> Self {
        Self {
            points,
            colors,
            normals,
        }
    }

    /// Get the number of points in the point cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get as reference the points in the point cloud.
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// Get as reference the colors of the points in the point cloud.
    pub fn colors(&self) -> Option<&[[u8; 3]]> {
        self.colors.as_deref()
    }

    /// Get as reference the normals of the points in the point cloud.
    pub fn normals(&self) -> Option<&[[f64; 3]]> {
        self.normals.as_deref()
    }

    /// Keep the points whose mask entry is `true`.
    ///
    /// Colors and normals are filtered with the same mask so that every
    /// attribute stays aligned with its point.
    ///
    /// PRECONDITION: `mask.len() == self.len()`.
    pub fn select_by_mask(&self, mask: &[bool]) -> Self {
        debug_assert_eq!(mask.len(), self.len());
        fn keep<T: Copy>(values: &[T], mask: &[bool]) -> Vec<T> {
            values
                .iter()
                .zip(mask)
                .filter_map(|(v, &m)| m.then_some(*v))
                .collect()
        }
        Self {
            points: keep(&self.points, mask),
            colors: self.colors.as_deref().map(|c| keep(c, mask)),
            normals: self.normals.as_deref().map(|n| keep(n, mask)),
        }
    }

    /// Keep one point every `every_k_points`, starting from the first one.
    ///
    /// A step of 0 or 1 returns a copy of the cloud.
    pub fn uniform_downsample(&self, every_k_points: usize) -> Self {
        if every_k_points <= 1 {
            return self.clone();
        }
        let mask = (0..self.len())
            .map(|i| i % every_k_points == 0)
            .collect::<Vec<_>>();
        self.select_by_mask(&mask)
    }

    /// Get the minimum bound of the point cloud.
    pub fn get_min_bound(&self) -> DVec3 {
        self.points
            .iter()
            .map(|p| DVec3::from_array(*p))
            .reduce(DVec3::min)
            .unwrap_or(DVec3::ZERO)
    }

    /// Get the maximum bound of the point cloud.
    pub fn get_max_bound(&self) -> DVec3 {
        self.points
            .iter()
            .map(|p| DVec3::from_array(*p))
            .reduce(DVec3::max)
            .unwrap_or(DVec3::ZERO)
    }
}
