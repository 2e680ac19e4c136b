use crate::hittable::{HitRecord, Hittable};
use crate::math::{Aabb, Point3, Ray, Vec3};
use itertools::iproduct;
use std::sync::Arc;

// ─── Translate ──────────────────────────────────────────────────────────────

/// Rigidly shifts a child hittable by `offset`. Instead of moving the
/// geometry, the incoming ray is displaced into the child's local frame and
/// the hit point shifted back out; directions and normals are unaffected.
pub struct Translate {
    child: Arc<dyn Hittable>,
    offset: Vec3,
}

impl Translate {
    pub fn new(child: Arc<dyn Hittable>, offset: Vec3) -> Self {
        Self { child, offset }
    }
}

impl Hittable for Translate {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let local_ray = Ray::new(ray.origin - self.offset, ray.direction, ray.time);
        let mut rec = self.child.hit(&local_ray, t_min, t_max)?;
        rec.point += self.offset;
        Some(rec)
    }

    fn bounding_box(&self, t_start: f64, t_end: f64) -> Option<Aabb> {
        self.child
            .bounding_box(t_start, t_end)
            .map(|bbox| bbox.translated(self.offset))
    }
}

// ─── Rotate ─────────────────────────────────────────────────────────────────

/// Rotates a child hittable about the principal axes by Euler angles given
/// in degrees. The forward transform is Rz·Ry·Rx (x applied first); the
/// reverse transform is its transpose. Rays are carried into the child's
/// local frame with the reverse transform, and hit positions and normals
/// carried back with the forward transform.
///
/// The bounding box is precomputed at construction by rotating the eight
/// corners of the child's box and taking their componentwise hull.
pub struct Rotate {
    child: Arc<dyn Hittable>,
    sin_theta: [f64; 3],
    cos_theta: [f64; 3],
    bbox: Option<Aabb>,
}

impl Rotate {
    pub fn new(child: Arc<dyn Hittable>, degrees: Vec3) -> Self {
        let radians = [
            degrees.x.to_radians(),
            degrees.y.to_radians(),
            degrees.z.to_radians(),
        ];
        let mut rotate = Self {
            child,
            sin_theta: radians.map(f64::sin),
            cos_theta: radians.map(f64::cos),
            bbox: None,
        };
        let enclosed = match rotate.child.bounding_box(0.0, 1.0) {
            Some(child_box) => Some(rotate.enclose(&child_box)),
            None => None,
        };
        rotate.bbox = enclosed;
        rotate
    }

    fn rotate_x(&self, v: Vec3, sign: f64) -> Vec3 {
        let s = sign * self.sin_theta[0];
        let c = self.cos_theta[0];
        Vec3::new(v.x, c * v.y - s * v.z, s * v.y + c * v.z)
    }

    fn rotate_y(&self, v: Vec3, sign: f64) -> Vec3 {
        let s = sign * self.sin_theta[1];
        let c = self.cos_theta[1];
        Vec3::new(c * v.x + s * v.z, v.y, -s * v.x + c * v.z)
    }

    fn rotate_z(&self, v: Vec3, sign: f64) -> Vec3 {
        let s = sign * self.sin_theta[2];
        let c = self.cos_theta[2];
        Vec3::new(c * v.x - s * v.y, s * v.x + c * v.y, v.z)
    }

    fn forward(&self, v: Vec3) -> Vec3 {
        self.rotate_z(self.rotate_y(self.rotate_x(v, 1.0), 1.0), 1.0)
    }

    fn reverse(&self, v: Vec3) -> Vec3 {
        self.rotate_x(self.rotate_y(self.rotate_z(v, -1.0), -1.0), -1.0)
    }

    fn enclose(&self, child_box: &Aabb) -> Aabb {
        let inf = f64::INFINITY;
        let mut min = Point3::new(inf, inf, inf);
        let mut max = Point3::new(-inf, -inf, -inf);

        for (i, j, k) in iproduct!(0..2, 0..2, 0..2) {
            let corner = Point3::new(
                if i == 1 { child_box.max.x } else { child_box.min.x },
                if j == 1 { child_box.max.y } else { child_box.min.y },
                if k == 1 { child_box.max.z } else { child_box.min.z },
            );
            let rotated = self.forward(corner);
            min = Point3::new(
                min.x.min(rotated.x),
                min.y.min(rotated.y),
                min.z.min(rotated.z),
            );
            max = Point3::new(
                max.x.max(rotated.x),
                max.y.max(rotated.y),
                max.z.max(rotated.z),
            );
        }

        Aabb::new(min, max)
    }
}

impl Hittable for Rotate {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let local_ray = Ray::new(
            self.reverse(ray.origin),
            self.reverse(ray.direction),
            ray.time,
        );
        let mut rec = self.child.hit(&local_ray, t_min, t_max)?;
        rec.point = self.forward(rec.point);
        // rotation preserves dot products, so the child's against-the-ray
        // orientation (and front_face) carries over unchanged
        rec.normal = self.forward(rec.normal);
        Some(rec)
    }

    fn bounding_box(&self, _t_start: f64, _t_end: f64) -> Option<Aabb> {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::{Cuboid, Sphere};
    use crate::material::Material;
    use crate::math::Color;

    fn gray() -> Arc<Material> {
        Arc::new(Material::lambertian(Color::new(0.5, 0.5, 0.5)))
    }

    fn unit_cuboid() -> Arc<dyn Hittable> {
        Arc::new(Cuboid::stationary(
            Point3::new(-1.0, -1.0, -1.0),
            Point3::new(1.0, 1.0, 1.0),
            gray(),
        ))
    }

    #[test]
    fn translate_shifts_hits_into_world_space() {
        let sphere = Arc::new(Sphere::stationary(Point3::zero(), 1.0, gray()));
        let moved = Translate::new(sphere, Vec3::new(0.0, 0.0, -5.0));

        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let hit = moved.hit(&ray, 0.001, f64::INFINITY).expect("hits");
        assert!((hit.t - 4.0).abs() < 1e-12);
        assert_eq!(hit.point, Point3::new(0.0, 0.0, -4.0));
        assert_eq!(hit.normal, Vec3::new(0.0, 0.0, 1.0));

        let bbox = moved.bounding_box(0.0, 1.0).unwrap();
        assert_eq!(bbox.min, Point3::new(-1.0, -1.0, -6.0));
        assert_eq!(bbox.max, Point3::new(1.0, 1.0, -4.0));
    }

    #[test]
    fn rotate_quarter_turn_about_y_carries_geometry_around() {
        let sphere = Arc::new(Sphere::stationary(Point3::new(2.0, 0.0, 0.0), 1.0, gray()));
        let rotated = Rotate::new(sphere, Vec3::new(0.0, 90.0, 0.0));

        // +90° about y maps (2, 0, 0) to (0, 0, -2)
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let hit = rotated.hit(&ray, 0.001, f64::INFINITY).expect("hits");
        assert!((hit.t - 1.0).abs() < 1e-9);
        assert!(ray.direction.dot(hit.normal) <= 0.0);
    }

    #[test]
    fn opposite_rotations_cancel_per_axis() {
        let ray = Ray::new(Point3::new(0.2, -0.1, 5.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let bare_t = unit_cuboid().hit(&ray, 0.001, f64::INFINITY).expect("hits").t;

        for axis_angles in [
            Vec3::new(30.0, 0.0, 0.0),
            Vec3::new(0.0, 55.0, 0.0),
            Vec3::new(0.0, 0.0, 120.0),
        ] {
            let wrapped = Rotate::new(
                Arc::new(Rotate::new(unit_cuboid(), axis_angles)),
                -axis_angles,
            );
            let hit = wrapped.hit(&ray, 0.001, f64::INFINITY).expect("identity still hits");
            assert!((hit.t - bare_t).abs() < 1e-9, "t drifted for {axis_angles}");
            assert!((hit.normal - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-9);
        }
    }

    #[test]
    fn rotated_bounding_box_encloses_all_corners() {
        let rotated = Rotate::new(unit_cuboid(), Vec3::new(0.0, 45.0, 0.0));
        let bbox = rotated.bounding_box(0.0, 1.0).unwrap();
        let sqrt2 = std::f64::consts::SQRT_2;
        assert!((bbox.min.x + sqrt2).abs() < 1e-9);
        assert!((bbox.max.x - sqrt2).abs() < 1e-9);
        assert!((bbox.min.y + 1.0).abs() < 1e-9);
        assert!((bbox.max.z - sqrt2).abs() < 1e-9);
    }
}
