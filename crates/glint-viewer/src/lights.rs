use glam::Vec3;
use glint_engine::lighting::Light;

/// Golden angle in radians; successive lights never line up radially.
const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// Deterministic set of animated point lights spread over the ground.
#[derive(Debug, Clone)]
pub struct LightField {
    base: Vec<Light>,
    phases: Vec<f32>,
    frame: Vec<Light>,
    bob_height: f32,
}

impl LightField {
    /// `count` lights on a golden-angle spiral of radius `spread`, hovering at `height`.
    pub fn spiral(count: usize, spread: f32, height: f32) -> Self {
        let mut base = Vec::with_capacity(count);
        let mut phases = Vec::with_capacity(count);

        for i in 0..count {
            let t = (i as f32 + 0.5) / count as f32;
            let r = spread * t.sqrt();
            let angle = i as f32 * GOLDEN_ANGLE;
            let position = Vec3::new(r * angle.cos(), height, r * angle.sin());

            let radius = 2.0 + 2.0 * fract(i as f32 * 0.618_034);
            let color = hue_to_rgb(fract(i as f32 * 0.137));
            base.push(Light::new(position, radius, color, 3.0));
            phases.push(angle);
        }

        Self {
            frame: base.clone(),
            base,
            phases,
            bob_height: height * 0.75,
        }
    }

    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Lights as of the last [`LightField::update`].
    pub fn current(&self) -> &[Light] {
        &self.frame
    }

    /// Light positions at time `t` (seconds). Each light bobs vertically on its own phase.
    pub fn update(&mut self, t: f32) -> &[Light] {
        for ((out, base), phase) in self.frame.iter_mut().zip(&self.base).zip(&self.phases) {
            let mut p = base.position();
            p.y += self.bob_height * (t * 1.3 + phase).sin();
            out.position = p.to_array();
        }
        &self.frame
    }
}

fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Fully saturated hue in `[0, 1)` to linear RGB.
fn hue_to_rgb(h: f32) -> Vec3 {
    let channel = |offset: f32| ((fract(h + offset) * 6.0 - 3.0).abs() - 1.0).clamp(0.0, 1.0);
    Vec3::new(channel(1.0), channel(2.0 / 3.0), channel(1.0 / 3.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spiral_is_deterministic() {
        let a = LightField::spiral(64, 20.0, 1.0);
        let b = LightField::spiral(64, 20.0, 1.0);
        assert_eq!(a.base, b.base);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn lights_stay_within_spread() {
        let field = LightField::spiral(500, 15.0, 1.0);
        for l in &field.base {
            let p = l.position();
            assert!(Vec3::new(p.x, 0.0, p.z).length() <= 15.0 + 1e-4);
            assert!((2.0..4.0).contains(&l.radius));
            assert!(l.color().max_element() > 0.99);
        }
    }

    #[test]
    fn bobbing_stays_above_ground() {
        let mut field = LightField::spiral(32, 10.0, 1.2);
        for step in 0..50 {
            for l in field.update(step as f32 * 0.37) {
                assert!(l.position[1] > 0.0);
                assert!(l.position[1] <= 1.2 * 1.75 + 1e-5);
            }
        }
    }

    #[test]
    fn hue_wheel_primaries() {
        assert_eq!(hue_to_rgb(0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!((hue_to_rgb(1.0 / 3.0) - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
        assert!((hue_to_rgb(2.0 / 3.0) - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn empty_field_is_allowed() {
        let mut field = LightField::spiral(0, 10.0, 1.0);
        assert!(field.is_empty());
        assert!(field.update(1.0).is_empty());
    }
}
