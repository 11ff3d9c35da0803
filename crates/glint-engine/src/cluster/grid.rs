use glam::{UVec3, Vec2, Vec3, Vec4, Vec4Swizzles};

use crate::camera::CameraUniforms;
use crate::config::ClusterConfig;

/// Local size of the clustering compute shader (`@workgroup_size(4, 4, 4)`).
pub const CLUSTER_WORKGROUP_SIZE: [u32; 3] = [4, 4, 4];

/// View-space axis-aligned box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    #[inline]
    pub fn include(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Closest-point test; touching counts as intersecting.
    #[inline]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        center.distance_squared(closest) <= radius * radius
    }

    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Box grown by `margin` on every side.
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }
}

/// Fixed partition of the view frustum into `Nx × Ny × Nz` clusters.
///
/// x and y split the viewport evenly (pixel origin top-left); z splits view depth
/// logarithmically between the camera's near and far planes. Cluster `(x, y, z)`
/// has linear index `x + y·Nx + z·Nx·Ny`.
///
/// Every method here is mirrored by `types.wgsl` / `clustering.wgsl`; keep the
/// two in step.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ClusterGrid {
    dims: UVec3,
    max_lights_per_cluster: u32,
}

impl Default for ClusterGrid {
    fn default() -> Self {
        Self::from_config(&ClusterConfig::default())
    }
}

impl ClusterGrid {
    /// Zero dimensions and a zero cap are raised to one.
    pub fn new(dims: [u32; 3], max_lights_per_cluster: u32) -> Self {
        Self {
            dims: UVec3::from_array(dims).max(UVec3::ONE),
            max_lights_per_cluster: max_lights_per_cluster.max(1),
        }
    }

    pub fn from_config(config: &ClusterConfig) -> Self {
        Self::new(config.dims, config.max_lights_per_cluster)
    }

    #[inline]
    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    #[inline]
    pub fn max_lights_per_cluster(&self) -> u32 {
        self.max_lights_per_cluster
    }

    #[inline]
    pub fn total_clusters(&self) -> u32 {
        self.dims.x * self.dims.y * self.dims.z
    }

    /// Length of the light-index buffer (fixed worst-case layout).
    #[inline]
    pub fn light_index_capacity(&self) -> u64 {
        u64::from(self.total_clusters()) * u64::from(self.max_lights_per_cluster)
    }

    /// Start of a cluster's run in the light-index buffer.
    #[inline]
    pub fn run_offset(&self, cluster: u32) -> u32 {
        cluster * self.max_lights_per_cluster
    }

    #[inline]
    pub fn linear_index(&self, coord: UVec3) -> u32 {
        coord.x + coord.y * self.dims.x + coord.z * self.dims.x * self.dims.y
    }

    #[inline]
    pub fn coord_of(&self, index: u32) -> UVec3 {
        let slice = self.dims.x * self.dims.y;
        UVec3::new(
            index % self.dims.x,
            (index % slice) / self.dims.x,
            index / slice,
        )
    }

    /// Workgroups to dispatch so every cluster gets one invocation.
    pub fn workgroup_count(&self) -> [u32; 3] {
        [
            self.dims.x.div_ceil(CLUSTER_WORKGROUP_SIZE[0]),
            self.dims.y.div_ceil(CLUSTER_WORKGROUP_SIZE[1]),
            self.dims.z.div_ceil(CLUSTER_WORKGROUP_SIZE[2]),
        ]
    }

    /// View depth where slice `k` begins. `k == Nz` yields `far`.
    #[inline]
    pub fn slice_depth(&self, k: u32, near: f32, far: f32) -> f32 {
        near * (far / near).powf(k as f32 / self.dims.z as f32)
    }

    pub fn slice_depth_bounds(&self, k: u32, near: f32, far: f32) -> (f32, f32) {
        (self.slice_depth(k, near, far), self.slice_depth(k + 1, near, far))
    }

    /// Depth slice for a positive view depth, clamped to `[0, Nz)`.
    pub fn depth_slice(&self, view_depth: f32, near: f32, far: f32) -> u32 {
        let t = ((view_depth.max(near) / near).ln() / (far / near).ln()).max(0.0);
        ((t * self.dims.z as f32) as u32).min(self.dims.z - 1)
    }

    /// Cluster for a fragment at pixel `frag_xy` and view depth `view_depth`.
    ///
    /// Every axis is clamped, so the result is always a valid index even for
    /// fragments at (or numerically past) the frustum boundary.
    pub fn cluster_at(&self, frag_xy: Vec2, view_depth: f32, camera: &CameraUniforms) -> u32 {
        let dims_xy = Vec2::new(self.dims.x as f32, self.dims.y as f32);
        let tile = (frag_xy / camera.viewport() * dims_xy).clamp(Vec2::ZERO, dims_xy - Vec2::ONE);
        let z = self.depth_slice(view_depth, camera.near, camera.far);
        self.linear_index(UVec3::new(tile.x as u32, tile.y as u32, z))
    }

    /// Like [`cluster_at`](Self::cluster_at), but `None` for points outside the
    /// frustum instead of clamping them in.
    pub fn try_cluster_at(
        &self,
        frag_xy: Vec2,
        view_depth: f32,
        camera: &CameraUniforms,
    ) -> Option<u32> {
        let viewport = camera.viewport();
        let inside_xy = frag_xy.cmpge(Vec2::ZERO).all() && frag_xy.cmplt(viewport).all();
        let inside_z = (camera.near..=camera.far).contains(&view_depth);
        if !inside_xy || !inside_z {
            return None;
        }
        Some(self.cluster_at(frag_xy, view_depth, camera))
    }

    /// Conservative view-space bounds of a cluster.
    ///
    /// The tile's four NDC corners are unprojected to view rays and cut by the
    /// slice's two depth planes; the box spans the eight resulting points.
    pub fn cluster_bounds(&self, coord: UVec3, camera: &CameraUniforms) -> Aabb {
        let d = self.dims.as_vec3();
        let c = coord.as_vec3();
        let x0 = c.x / d.x * 2.0 - 1.0;
        let x1 = (c.x + 1.0) / d.x * 2.0 - 1.0;
        // Pixel rows grow downward, NDC y grows upward.
        let y0 = 1.0 - (c.y + 1.0) / d.y * 2.0;
        let y1 = 1.0 - c.y / d.y * 2.0;

        let (z_near, z_far) = self.slice_depth_bounds(coord.z, camera.near, camera.far);
        let inv_proj = camera.inverse_projection();

        let mut bounds = Aabb::EMPTY;
        for ndc in [Vec2::new(x0, y0), Vec2::new(x1, y0), Vec2::new(x0, y1), Vec2::new(x1, y1)] {
            let p = inv_proj * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
            let ray = p.xyz() / p.w;
            for depth in [z_near, z_far] {
                bounds.include(ray * (depth / -ray.z));
            }
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use approx::assert_relative_eq;
    use glam::Mat4;

    fn camera() -> (Camera, CameraUniforms) {
        let cam = Camera::default();
        (cam, cam.uniforms(1280, 720))
    }

    fn project(cam: &Camera, u: &CameraUniforms, view_pos: Vec3) -> Vec2 {
        let proj: Mat4 = cam.projection(u.viewport[0] / u.viewport[1]);
        let clip = proj * view_pos.extend(1.0);
        let ndc = clip.xy() / clip.w;
        Vec2::new((ndc.x + 1.0) * 0.5 * u.viewport[0], (1.0 - ndc.y) * 0.5 * u.viewport[1])
    }

    // ── indexing ──────────────────────────────────────────────────────────

    #[test]
    fn linear_index_and_coord_are_inverse() {
        let grid = ClusterGrid::default();
        for i in [0, 1, 15, 16, 143, 144, 3455] {
            assert_eq!(grid.linear_index(grid.coord_of(i)), i);
        }
        assert_eq!(grid.total_clusters(), 16 * 9 * 24);
    }

    #[test]
    fn workgroups_cover_the_grid() {
        let grid = ClusterGrid::default();
        assert_eq!(grid.workgroup_count(), [4, 3, 6]);
    }

    #[test]
    fn zero_dims_are_raised() {
        let grid = ClusterGrid::new([0, 2, 0], 0);
        assert_eq!(grid.dims(), UVec3::new(1, 2, 1));
        assert_eq!(grid.max_lights_per_cluster(), 1);
    }

    // ── depth slicing ─────────────────────────────────────────────────────

    #[test]
    fn slices_span_near_to_far() {
        let grid = ClusterGrid::default();
        assert_relative_eq!(grid.slice_depth(0, 0.1, 100.0), 0.1, epsilon = 1e-6);
        assert_relative_eq!(grid.slice_depth(24, 0.1, 100.0), 100.0, epsilon = 1e-3);
    }

    #[test]
    fn depth_slice_matches_slice_bounds() {
        let grid = ClusterGrid::default();
        for k in 0..24 {
            let (a, b) = grid.slice_depth_bounds(k, 0.1, 100.0);
            let mid = (a * b).sqrt();
            assert_eq!(grid.depth_slice(mid, 0.1, 100.0), k);
        }
    }

    #[test]
    fn depth_slice_clamps_outside_range() {
        let grid = ClusterGrid::default();
        assert_eq!(grid.depth_slice(0.0, 0.1, 100.0), 0);
        assert_eq!(grid.depth_slice(100.0, 0.1, 100.0), 23);
        assert_eq!(grid.depth_slice(1.0e9, 0.1, 100.0), 23);
    }

    // ── fragment mapping ──────────────────────────────────────────────────

    #[test]
    fn cluster_at_clamps_to_valid_range() {
        let grid = ClusterGrid::default();
        let (_, u) = camera();
        let last = grid.total_clusters() - 1;
        assert_eq!(grid.cluster_at(Vec2::new(1280.0, 720.0), 100.0, &u), last);
        assert_eq!(grid.cluster_at(Vec2::new(5000.0, 9000.0), 1.0e6, &u), last);
        assert_eq!(grid.cluster_at(Vec2::new(-3.0, -3.0), 0.0, &u), 0);
    }

    #[test]
    fn try_cluster_at_rejects_points_outside_frustum() {
        let grid = ClusterGrid::default();
        let (_, u) = camera();
        assert!(grid.try_cluster_at(Vec2::new(10.0, 10.0), 0.05, &u).is_none());
        assert!(grid.try_cluster_at(Vec2::new(10.0, 10.0), 150.0, &u).is_none());
        assert!(grid.try_cluster_at(Vec2::new(-1.0, 10.0), 5.0, &u).is_none());
        assert!(grid.try_cluster_at(Vec2::new(10.0, 720.0), 5.0, &u).is_none());
        assert!(grid.try_cluster_at(Vec2::new(10.0, 10.0), 5.0, &u).is_some());
    }

    #[test]
    fn top_left_pixel_is_cluster_row_zero() {
        let grid = ClusterGrid::default();
        let (_, u) = camera();
        let c = grid.coord_of(grid.cluster_at(Vec2::new(0.5, 0.5), 0.1, &u));
        assert_eq!(c, UVec3::ZERO);
        let c = grid.coord_of(grid.cluster_at(Vec2::new(1279.5, 719.5), 0.1, &u));
        assert_eq!(c, UVec3::new(15, 8, 0));
    }

    // ── bounds ────────────────────────────────────────────────────────────

    #[test]
    fn frustum_points_land_inside_their_cluster_bounds() {
        let grid = ClusterGrid::default();
        let (cam, u) = camera();

        // Deterministic sweep across the frustum in NDC x/y and log depth.
        let mut checked = 0;
        for i in 0..40 {
            for j in 0..30 {
                for k in 0..20 {
                    let ndc = Vec2::new(
                        -0.99 + 1.98 * (i as f32 + 0.37) / 40.0,
                        -0.99 + 1.98 * (j as f32 + 0.61) / 30.0,
                    );
                    let depth = 0.1 * 1000f32.powf((k as f32 + 0.5) / 20.0);
                    let p = u.inverse_projection() * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
                    let ray = p.xyz() / p.w;
                    let view_pos = ray * (depth / -ray.z);

                    let frag = project(&cam, &u, view_pos);
                    let cluster = grid
                        .try_cluster_at(frag, -view_pos.z, &u)
                        .expect("point inside the frustum maps to a cluster");
                    let bounds = grid.cluster_bounds(grid.coord_of(cluster), &u);
                    assert!(
                        bounds.expanded(1e-3 * depth).contains(view_pos),
                        "{view_pos:?} outside cluster {cluster} {bounds:?}"
                    );
                    checked += 1;
                }
            }
        }
        assert_eq!(checked, 40 * 30 * 20);
    }

    #[test]
    fn bounds_lie_in_front_of_camera() {
        let grid = ClusterGrid::default();
        let (_, u) = camera();
        for index in [0, 100, 2000, grid.total_clusters() - 1] {
            let b = grid.cluster_bounds(grid.coord_of(index), &u);
            assert!(b.max.z < 0.0);
            assert!(b.min.cmple(b.max).all());
        }
    }

    #[test]
    fn sphere_touching_box_intersects() {
        let b = Aabb {
            min: Vec3::ZERO,
            max: Vec3::ONE,
        };
        assert!(b.intersects_sphere(Vec3::new(2.0, 0.5, 0.5), 1.0));
        assert!(!b.intersects_sphere(Vec3::new(2.1, 0.5, 0.5), 1.0));
        assert!(b.intersects_sphere(Vec3::splat(0.5), 0.01));
    }
}
