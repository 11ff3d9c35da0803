use glam::Vec3;

use crate::camera::CameraUniforms;
use crate::lighting::Light;

use super::{ClusterGrid, ClusterRecord};

/// Host-side copy of the two clustering outputs, in the GPU layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAssignment {
    records: Vec<ClusterRecord>,
    indices: Vec<u32>,
}

/// Summary of how full the clusters are.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OccupancyStats {
    pub clusters: u32,
    /// Clusters with no light.
    pub empty: u32,
    /// Clusters that hit the per-cluster cap (possibly truncated).
    pub saturated: u32,
    pub max: u32,
    pub mean: f32,
}

impl ClusterAssignment {
    pub fn records(&self) -> &[ClusterRecord] {
        &self.records
    }

    /// Full light-index buffer, including unused tails of each run.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Light indices recorded for `cluster`, in light-set order.
    pub fn lights_in(&self, cluster: u32) -> &[u32] {
        let r = self.records[cluster as usize];
        &self.indices[r.offset as usize..(r.offset + r.count) as usize]
    }

    pub fn occupancy(&self, grid: &ClusterGrid) -> OccupancyStats {
        let cap = grid.max_lights_per_cluster();
        let mut stats = OccupancyStats {
            clusters: self.records.len() as u32,
            empty: 0,
            saturated: 0,
            max: 0,
            mean: 0.0,
        };
        let mut total = 0u64;
        for r in &self.records {
            total += u64::from(r.count);
            stats.max = stats.max.max(r.count);
            if r.count == 0 {
                stats.empty += 1;
            }
            if r.count >= cap {
                stats.saturated += 1;
            }
        }
        if stats.clusters > 0 {
            stats.mean = total as f32 / stats.clusters as f32;
        }
        stats
    }
}

/// Assigns lights to clusters on the CPU.
///
/// Same algorithm as `clustering.wgsl`: lights are visited in light-set order and
/// a cluster's run stops growing once it holds `max_lights_per_cluster` entries.
pub fn assign_lights(
    grid: &ClusterGrid,
    camera: &CameraUniforms,
    lights: &[Light],
) -> ClusterAssignment {
    let cap = grid.max_lights_per_cluster();
    let total = grid.total_clusters();

    let view = camera.view_matrix();
    let centers: Vec<Vec3> = lights
        .iter()
        .map(|l| view.transform_point3(l.position()))
        .collect();

    let mut records = vec![ClusterRecord::default(); total as usize];
    let mut indices = vec![0u32; grid.light_index_capacity() as usize];

    for cluster in 0..total {
        let bounds = grid.cluster_bounds(grid.coord_of(cluster), camera);
        let offset = grid.run_offset(cluster);
        let mut count = 0u32;

        for (i, (light, center)) in lights.iter().zip(&centers).enumerate() {
            if count >= cap {
                break;
            }
            if bounds.intersects_sphere(*center, light.radius) {
                indices[(offset + count) as usize] = i as u32;
                count += 1;
            }
        }

        records[cluster as usize] = ClusterRecord { offset, count };
    }

    ClusterAssignment { records, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use glam::{Vec3, Vec4, Vec4Swizzles};

    /// Small deterministic generator so tests do not depend on a RNG crate.
    struct Lcg(u64);

    impl Lcg {
        fn next_f32(&mut self) -> f32 {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((self.0 >> 40) as f32) / (1u64 << 24) as f32
        }

        fn range(&mut self, lo: f32, hi: f32) -> f32 {
            lo + (hi - lo) * self.next_f32()
        }
    }

    fn scattered_lights(n: usize, seed: u64) -> Vec<Light> {
        let mut rng = Lcg(seed);
        (0..n)
            .map(|_| {
                Light::new(
                    Vec3::new(rng.range(-12.0, 12.0), rng.range(-1.0, 6.0), rng.range(-15.0, 10.0)),
                    rng.range(0.5, 4.0),
                    Vec3::ONE,
                    1.0,
                )
            })
            .collect()
    }

    /// Independent re-derivation of the cluster wedge corners and the
    /// sphere/box distance, used to check the assignment.
    fn provably_intersects(grid: &ClusterGrid, u: &CameraUniforms, cluster: u32, light: &Light) -> bool {
        let c = grid.coord_of(cluster);
        let d = grid.dims();
        let inv = u.inverse_projection();
        let near = u.near * (u.far / u.near).powf(c.z as f32 / d.z as f32);
        let far = u.near * (u.far / u.near).powf((c.z + 1) as f32 / d.z as f32);

        let mut lo = Vec3::splat(f32::INFINITY);
        let mut hi = Vec3::splat(f32::NEG_INFINITY);
        for (cx, cy) in [(c.x, c.y), (c.x + 1, c.y), (c.x, c.y + 1), (c.x + 1, c.y + 1)] {
            let ndc_x = 2.0 * cx as f32 / d.x as f32 - 1.0;
            let ndc_y = 1.0 - 2.0 * cy as f32 / d.y as f32;
            let p = inv * Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
            let dir = p.xyz() / p.w;
            for depth in [near, far] {
                let q = dir * (depth / -dir.z);
                lo = lo.min(q);
                hi = hi.max(q);
            }
        }

        let center = u.view_matrix().transform_point3(light.position());
        let mut dist2 = 0.0;
        for axis in 0..3 {
            let v = center[axis];
            if v < lo[axis] {
                dist2 += (lo[axis] - v).powi(2);
            } else if v > hi[axis] {
                dist2 += (v - hi[axis]).powi(2);
            }
        }
        // Slack so float noise on the box faces cannot flip a borderline case.
        dist2 < light.radius * light.radius * 0.999
    }

    #[test]
    fn every_intersecting_light_is_recorded() {
        let grid = ClusterGrid::default();
        let u = Camera::default().uniforms(1600, 900);
        let lights = scattered_lights(300, 7);
        let a = assign_lights(&grid, &u, &lights);

        let mut pairs = 0;
        for cluster in 0..grid.total_clusters() {
            let run = a.lights_in(cluster);
            if run.len() as u32 == grid.max_lights_per_cluster() {
                continue;
            }
            for (i, light) in lights.iter().enumerate() {
                if provably_intersects(&grid, &u, cluster, light) {
                    assert!(run.contains(&(i as u32)), "light {i} missing from cluster {cluster}");
                    pairs += 1;
                }
            }
        }
        assert!(pairs > 0, "scene should produce some light/cluster overlap");
    }

    #[test]
    fn truncation_keeps_the_first_intersecting_lights() {
        let grid = ClusterGrid::new([4, 4, 4], 3);
        let cam = Camera::default();
        let u = cam.uniforms(800, 600);

        // Light 0 sits behind the camera and touches nothing; the rest cover the frustum.
        let mut lights = vec![Light::new(cam.eye * 10.0, 0.1, Vec3::ONE, 1.0)];
        lights.extend((0..9).map(|i| Light::new(cam.target, 500.0 + i as f32, Vec3::ONE, 1.0)));

        let a = assign_lights(&grid, &u, &lights);
        for cluster in 0..grid.total_clusters() {
            assert_eq!(a.records()[cluster as usize].count, 3);
            assert_eq!(a.lights_in(cluster), &[1, 2, 3]);
        }
    }

    #[test]
    fn truncation_is_a_prefix_of_iteration_order() {
        let grid = ClusterGrid::new([8, 6, 8], 4);
        let u = Camera::default().uniforms(1280, 720);
        let lights = scattered_lights(400, 99);
        let a = assign_lights(&grid, &u, &lights);

        for cluster in 0..grid.total_clusters() {
            let bounds = grid.cluster_bounds(grid.coord_of(cluster), &u);
            let expected: Vec<u32> = lights
                .iter()
                .enumerate()
                .filter(|(_, l)| {
                    bounds.intersects_sphere(u.view_matrix().transform_point3(l.position()), l.radius)
                })
                .map(|(i, _)| i as u32)
                .take(4)
                .collect();
            assert_eq!(a.lights_in(cluster), expected.as_slice());
        }
    }

    #[test]
    fn runs_stay_in_bounds() {
        let grid = ClusterGrid::default();
        let u = Camera::default().uniforms(1920, 1080);
        let lights = scattered_lights(500, 3);
        let a = assign_lights(&grid, &u, &lights);

        let len = a.indices().len() as u64;
        assert_eq!(len, grid.light_index_capacity());
        for (cluster, r) in a.records().iter().enumerate() {
            assert!(u64::from(r.offset) + u64::from(r.count) <= len);
            assert!(r.count <= grid.max_lights_per_cluster());
            assert_eq!(r.offset, grid.run_offset(cluster as u32));
            for &i in a.lights_in(cluster as u32) {
                assert!((i as usize) < lights.len());
            }
        }
    }

    #[test]
    fn runs_are_disjoint() {
        let grid = ClusterGrid::new([4, 3, 5], 7);
        let u = Camera::default().uniforms(640, 480);
        let a = assign_lights(&grid, &u, &scattered_lights(50, 11));

        let mut spans: Vec<(u32, u32)> =
            a.records().iter().map(|r| (r.offset, r.offset + r.count)).collect();
        spans.sort_unstable();
        for w in spans.windows(2) {
            assert!(w[0].1 <= w[1].0);
        }
    }

    #[test]
    fn single_light_covering_frustum_lands_in_every_cluster() {
        let grid = ClusterGrid::new([16, 9, 24], 100);
        let cam = Camera::default();
        let u = cam.uniforms(1600, 900);
        let lights = [Light::new(cam.target, 1000.0, Vec3::ONE, 1.0)];

        let a = assign_lights(&grid, &u, &lights);
        for cluster in 0..grid.total_clusters() {
            assert_eq!(a.records()[cluster as usize].count, 1);
            assert_eq!(a.lights_in(cluster), &[0]);
        }
    }

    #[test]
    fn zero_lights_leave_every_cluster_empty() {
        let grid = ClusterGrid::new([16, 9, 24], 100);
        let u = Camera::default().uniforms(1600, 900);
        let a = assign_lights(&grid, &u, &[]);

        assert!(a.records().iter().all(|r| r.count == 0));
        let stats = a.occupancy(&grid);
        assert_eq!(stats.empty, grid.total_clusters());
        assert_eq!(stats.max, 0);
        assert_eq!(stats.mean, 0.0);
    }

    #[test]
    fn occupancy_counts_saturated_clusters() {
        let grid = ClusterGrid::new([2, 2, 2], 2);
        let cam = Camera::default();
        let u = cam.uniforms(100, 100);
        let lights: Vec<Light> = (0..5).map(|_| Light::new(cam.target, 1000.0, Vec3::ONE, 1.0)).collect();

        let stats = assign_lights(&grid, &u, &lights).occupancy(&grid);
        assert_eq!(stats.clusters, 8);
        assert_eq!(stats.saturated, 8);
        assert_eq!(stats.max, 2);
        assert_eq!(stats.mean, 2.0);
    }
}
