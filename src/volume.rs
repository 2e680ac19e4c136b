use crate::hittable::{HitRecord, Hittable};
use crate::material::Material;
use crate::math::{Aabb, Color, Ray, Vec3};
use crate::rng;
use crate::texture::Texture;
use rand::Rng;
use std::sync::Arc;

/// A constant-density participating medium filling the interior of a convex
/// boundary hittable. Each traversal samples an exponentially distributed
/// free-flight distance; if the sample falls inside the boundary span the
/// ray scatters there through the isotropic phase function, otherwise the
/// medium is transparent for that ray.
///
/// Free-flight sampling draws from the thread-local generator, keeping the
/// `Hittable` protocol free of an RNG parameter.
pub struct ConstantMedium {
    boundary: Arc<dyn Hittable>,
    phase_function: Material,
    neg_inv_density: f64,
}

impl ConstantMedium {
    pub fn new(boundary: Arc<dyn Hittable>, density: f64, albedo: Color) -> Self {
        Self {
            boundary,
            phase_function: Material::isotropic(albedo),
            neg_inv_density: -1.0 / density,
        }
    }

    pub fn textured(boundary: Arc<dyn Hittable>, density: f64, albedo: Arc<Texture>) -> Self {
        Self {
            boundary,
            phase_function: Material::isotropic_textured(albedo),
            neg_inv_density: -1.0 / density,
        }
    }
}

impl Hittable for ConstantMedium {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        // entry and exit of the boundary, irrespective of the caller's range
        let entry = self
            .boundary
            .hit(ray, f64::NEG_INFINITY, f64::INFINITY)?;
        let exit = self.boundary.hit(ray, entry.t + 1e-4, f64::INFINITY)?;

        let mut t_entry = entry.t.max(t_min);
        let t_exit = exit.t.min(t_max);
        if t_entry >= t_exit {
            return None;
        }
        t_entry = t_entry.max(0.0);

        let ray_speed = ray.direction.length();
        let distance_inside = (t_exit - t_entry) * ray_speed;
        let free_flight =
            self.neg_inv_density * rng::with_local_rng(|rng| rng.gen::<f64>()).ln();

        if free_flight > distance_inside {
            return None;
        }

        let t = t_entry + free_flight / ray_speed;
        Some(HitRecord {
            point: ray.at(t),
            // arbitrary: a volume sample has no meaningful surface frame
            normal: Vec3::unit_x(),
            t,
            u: 0.0,
            v: 0.0,
            front_face: true,
            material: &self.phase_function,
        })
    }

    fn bounding_box(&self, t_start: f64, t_end: f64) -> Option<Aabb> {
        self.boundary.bounding_box(t_start, t_end)
    }
}
