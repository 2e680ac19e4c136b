use crate::material::Material;
use crate::math::{Aabb, Point3, Ray, Vec3};
use std::f64::consts::PI;
use std::sync::Arc;

// ─── Hit Record ─────────────────────────────────────────────────────────────

/// The intersection payload. `normal` is always unit length and oriented
/// against the incoming ray; `front_face` records whether that orientation
/// matches the outward geometric normal. `u`, `v` are the surface parameters
/// in [0, 1] (zero when the primitive has no natural parameterization).
pub struct HitRecord<'a> {
    pub point: Point3,
    pub normal: Vec3,
    pub t: f64,
    pub u: f64,
    pub v: f64,
    pub front_face: bool,
    pub material: &'a Material,
}

impl<'a> HitRecord<'a> {
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction.dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

// ─── Hittable Protocol ──────────────────────────────────────────────────────

/// The intersection capability shared by every scene entity. `bounding_box`
/// may return `None` for unbounded participating media; the BVH rejects such
/// children at construction time.
pub trait Hittable: Send + Sync {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>>;
    fn bounding_box(&self, t_start: f64, t_end: f64) -> Option<Aabb>;
}

// ─── Hittable List ──────────────────────────────────────────────────────────

/// A flat collection with linear closest-hit intersection. Scene presets
/// assemble into a list, which is then (usually) wrapped in a BVH.
#[derive(Default)]
pub struct HittableList {
    objects: Vec<Arc<dyn Hittable>>,
}

impl HittableList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: Arc<dyn Hittable>) {
        self.objects.push(object);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn into_objects(self) -> Vec<Arc<dyn Hittable>> {
        self.objects
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let mut closest = t_max;
        let mut best = None;
        for object in &self.objects {
            if let Some(hit) = object.hit(ray, t_min, closest) {
                closest = hit.t;
                best = Some(hit);
            }
        }
        best
    }

    fn bounding_box(&self, t_start: f64, t_end: f64) -> Option<Aabb> {
        if self.objects.is_empty() {
            return None;
        }
        let mut enclosing: Option<Aabb> = None;
        for object in &self.objects {
            let child = object.bounding_box(t_start, t_end)?;
            enclosing = Some(match enclosing {
                Some(so_far) => Aabb::surrounding(&so_far, &child),
                None => child,
            });
        }
        enclosing
    }
}

// ─── Sphere ─────────────────────────────────────────────────────────────────

/// A sphere whose center moves linearly from `start_center` at `start_time`
/// to `end_center` at `end_time`, sampled at each ray's shutter time. A
/// stationary sphere is the degenerate case with both centers equal.
pub struct Sphere {
    start_center: Point3,
    end_center: Point3,
    start_time: f64,
    end_time: f64,
    radius: f64,
    material: Arc<Material>,
}

impl Sphere {
    pub fn stationary(center: Point3, radius: f64, material: Arc<Material>) -> Self {
        Self {
            start_center: center,
            end_center: center,
            start_time: 0.0,
            end_time: 1.0,
            radius,
            material,
        }
    }

    pub fn moving(
        start_center: Point3,
        end_center: Point3,
        start_time: f64,
        end_time: f64,
        radius: f64,
        material: Arc<Material>,
    ) -> Self {
        Self {
            start_center,
            end_center,
            start_time,
            end_time,
            radius,
            material,
        }
    }

    fn center(&self, time: f64) -> Point3 {
        let span = self.end_time - self.start_time;
        // a zero-width exposure interval means the sphere never moves
        if span.abs() < f64::EPSILON {
            return self.start_center;
        }
        self.start_center
            + (self.end_center - self.start_center) * ((time - self.start_time) / span)
    }

    /// Maps an outward unit normal to (u, v): u is the angle around the Y
    /// axis from X = −1, v the angle from Y = −1 to Y = +1.
    ///   (1, 0, 0) → (0.50, 0.50)    (−1,  0,  0) → (0.00, 0.50)
    ///   (0, 1, 0) → (0.50, 1.00)    ( 0, −1,  0) → (0.50, 0.00)
    ///   (0, 0, 1) → (0.25, 0.50)    ( 0,  0, −1) → (0.75, 0.50)
    fn surface_uv(outward: Vec3) -> (f64, f64) {
        let u = ((-outward.z).atan2(outward.x) + PI) / (2.0 * PI);
        let v = (-outward.y).acos() / PI;
        (u, v)
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let center = self.center(ray.time);
        let oc = ray.origin - center;
        let a = ray.direction.length_squared();
        let half_b = oc.dot(ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;
        let discriminant = half_b * half_b - a * c;

        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        let mut root = (-half_b - sqrtd) / a;
        if root < t_min || root > t_max {
            root = (-half_b + sqrtd) / a;
            if root < t_min || root > t_max {
                return None;
            }
        }

        let point = ray.at(root);
        let outward_normal = (point - center) / self.radius;
        let (u, v) = Self::surface_uv(outward_normal);
        let mut rec = HitRecord {
            point,
            normal: outward_normal,
            t: root,
            u,
            v,
            front_face: true,
            material: self.material.as_ref(),
        };
        rec.set_face_normal(ray, outward_normal);
        Some(rec)
    }

    fn bounding_box(&self, t_start: f64, t_end: f64) -> Option<Aabb> {
        let r = self.radius.abs();
        let extent = Vec3::new(r, r, r);
        let open = self.center(t_start);
        let close = self.center(t_end);
        Some(Aabb::surrounding(
            &Aabb::new(open - extent, open + extent),
            &Aabb::new(close - extent, close + extent),
        ))
    }
}

// ─── Axis-Aligned Rectangle ─────────────────────────────────────────────────

/// Which coordinate plane a rectangle lies in. The two named axes vary; the
/// remaining axis is held at the rectangle's plane constant.
#[derive(Debug, Clone, Copy)]
pub enum RectPlane {
    Xy,
    Xz,
    Yz,
}

impl RectPlane {
    /// Component indices (first varying, second varying, fixed).
    const fn axes(self) -> (usize, usize, usize) {
        match self {
            RectPlane::Xy => (0, 1, 2),
            RectPlane::Xz => (0, 2, 1),
            RectPlane::Yz => (1, 2, 0),
        }
    }

    /// Builds a point from components in (varying-a, varying-b, fixed) order.
    const fn compose(self, a: f64, b: f64, k: f64) -> Point3 {
        match self {
            RectPlane::Xy => Point3::new(a, b, k),
            RectPlane::Xz => Point3::new(a, k, b),
            RectPlane::Yz => Point3::new(k, a, b),
        }
    }

    const fn outward_normal(self) -> Vec3 {
        match self {
            RectPlane::Xy => Vec3::unit_z(),
            RectPlane::Xz => Vec3::unit_y(),
            RectPlane::Yz => Vec3::unit_x(),
        }
    }
}

/// An axis-aligned rectangle spanning [a0, a1] × [b0, b1] at plane constant
/// `k`, optionally displaced linearly over the shutter interval for motion
/// blur. The plane variant fixes which axes those ranges refer to.
pub struct Rect {
    plane: RectPlane,
    a0: f64,
    a1: f64,
    b0: f64,
    b1: f64,
    k: f64,
    start_time: f64,
    end_time: f64,
    displacement: Vec3,
    material: Arc<Material>,
}

impl Rect {
    pub fn xy(x0: f64, x1: f64, y0: f64, y1: f64, z: f64, material: Arc<Material>) -> Self {
        Self::plane(RectPlane::Xy, x0, x1, y0, y1, z, material)
    }

    pub fn xz(x0: f64, x1: f64, z0: f64, z1: f64, y: f64, material: Arc<Material>) -> Self {
        Self::plane(RectPlane::Xz, x0, x1, z0, z1, y, material)
    }

    pub fn yz(y0: f64, y1: f64, z0: f64, z1: f64, x: f64, material: Arc<Material>) -> Self {
        Self::plane(RectPlane::Yz, y0, y1, z0, z1, x, material)
    }

    fn plane(
        plane: RectPlane,
        a0: f64,
        a1: f64,
        b0: f64,
        b1: f64,
        k: f64,
        material: Arc<Material>,
    ) -> Self {
        Self {
            plane,
            a0,
            a1,
            b0,
            b1,
            k,
            start_time: 0.0,
            end_time: 1.0,
            displacement: Vec3::zero(),
            material,
        }
    }

    /// Displaces the rectangle by up to `displacement` linearly across the
    /// shutter interval [start_time, end_time].
    pub fn with_displacement(mut self, displacement: Vec3, start_time: f64, end_time: f64) -> Self {
        self.displacement = displacement;
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    /// Fraction of the displacement applied at `time`, clamped to [0, 1].
    /// A zero-width shutter never displaces.
    fn shutter_fraction(&self, time: f64) -> f64 {
        let span = self.end_time - self.start_time;
        if span.abs() < f64::EPSILON {
            return 0.0;
        }
        ((time - self.start_time) / span).clamp(0.0, 1.0)
    }
}

impl Hittable for Rect {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        let (a_axis, b_axis, k_axis) = self.plane.axes();
        let delta = self.displacement * self.shutter_fraction(ray.time);

        let t = (self.k + delta[k_axis] - ray.origin[k_axis]) / ray.direction[k_axis];
        if !t.is_finite() || t < t_min || t > t_max {
            return None;
        }

        let a = ray.origin[a_axis] + t * ray.direction[a_axis];
        let b = ray.origin[b_axis] + t * ray.direction[b_axis];
        let (a_lo, a_hi) = (self.a0 + delta[a_axis], self.a1 + delta[a_axis]);
        let (b_lo, b_hi) = (self.b0 + delta[b_axis], self.b1 + delta[b_axis]);
        if a < a_lo || a > a_hi || b < b_lo || b > b_hi {
            return None;
        }

        let outward_normal = self.plane.outward_normal();
        let mut rec = HitRecord {
            point: ray.at(t),
            normal: outward_normal,
            t,
            u: (a - a_lo) / (self.a1 - self.a0),
            v: (b - b_lo) / (self.b1 - self.b0),
            front_face: true,
            material: self.material.as_ref(),
        };
        rec.set_face_normal(ray, outward_normal);
        Some(rec)
    }

    fn bounding_box(&self, _t_start: f64, _t_end: f64) -> Option<Aabb> {
        // padded on the degenerate axis so the slab test has nonzero extent
        const PAD: f64 = 1e-4;
        let open = Aabb::new(
            self.plane.compose(self.a0, self.b0, self.k - PAD),
            self.plane.compose(self.a1, self.b1, self.k + PAD),
        );
        let close = open.translated(self.displacement);
        Some(Aabb::surrounding(&open, &close))
    }
}

// ─── Box ────────────────────────────────────────────────────────────────────

/// An axis-aligned box composed of six rectangles in a hittable list. The
/// optional displacement is threaded through to every face so the whole box
/// motion-blurs as one rigid body.
pub struct Cuboid {
    min: Point3,
    max: Point3,
    displacement: Vec3,
    sides: HittableList,
}

impl Cuboid {
    pub fn stationary(min: Point3, max: Point3, material: Arc<Material>) -> Self {
        Self::moving(min, max, material, 0.0, 1.0, Vec3::zero())
    }

    pub fn moving(
        min: Point3,
        max: Point3,
        material: Arc<Material>,
        start_time: f64,
        end_time: f64,
        displacement: Vec3,
    ) -> Self {
        let mut sides = HittableList::new();
        let displaced = |rect: Rect| rect.with_displacement(displacement, start_time, end_time);

        sides.add(Arc::new(displaced(Rect::xy(
            min.x, max.x, min.y, max.y, max.z,
            material.clone(),
        ))));
        sides.add(Arc::new(displaced(Rect::xy(
            min.x, max.x, min.y, max.y, min.z,
            material.clone(),
        ))));
        sides.add(Arc::new(displaced(Rect::xz(
            min.x, max.x, min.z, max.z, max.y,
            material.clone(),
        ))));
        sides.add(Arc::new(displaced(Rect::xz(
            min.x, max.x, min.z, max.z, min.y,
            material.clone(),
        ))));
        sides.add(Arc::new(displaced(Rect::yz(
            min.y, max.y, min.z, max.z, max.x,
            material.clone(),
        ))));
        sides.add(Arc::new(displaced(Rect::yz(
            min.y, max.y, min.z, max.z, min.x,
            material,
        ))));

        Self {
            min,
            max,
            displacement,
            sides,
        }
    }
}

impl Hittable for Cuboid {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        self.sides.hit(ray, t_min, t_max)
    }

    fn bounding_box(&self, _t_start: f64, _t_end: f64) -> Option<Aabb> {
        let open = Aabb::new(self.min, self.max);
        Some(Aabb::surrounding(
            &open,
            &open.translated(self.displacement),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Color;

    fn gray() -> Arc<Material> {
        Arc::new(Material::lambertian(Color::new(0.5, 0.5, 0.5)))
    }

    #[test]
    fn sphere_hit_from_outside() {
        let sphere = Sphere::stationary(Point3::new(0.0, 0.0, -5.0), 1.0, gray());
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let hit = sphere.hit(&ray, 0.001, f64::INFINITY).expect("hits");
        assert!((hit.t - 4.0).abs() < 1e-12);
        assert_eq!(hit.point, Point3::new(0.0, 0.0, -4.0));
        assert_eq!(hit.normal, Vec3::new(0.0, 0.0, 1.0));
        assert!(hit.front_face);
    }

    #[test]
    fn sphere_hit_from_inside_flips_the_normal() {
        let sphere = Sphere::stationary(Point3::new(0.0, 0.0, -5.0), 1.0, gray());
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0), 0.0);
        let hit = sphere.hit(&ray, 0.001, f64::INFINITY).expect("hits");
        assert!(!hit.front_face);
        assert!(ray.direction.dot(hit.normal) <= 0.0);
        assert!((hit.t - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sphere_uv_matches_the_cardinal_directions() {
        let cases = [
            (Vec3::new(1.0, 0.0, 0.0), (0.5, 0.5)),
            (Vec3::new(0.0, 1.0, 0.0), (0.5, 1.0)),
            (Vec3::new(0.0, 0.0, 1.0), (0.25, 0.5)),
            (Vec3::new(-1.0, 0.0, 0.0), (0.0, 0.5)),
            (Vec3::new(0.0, -1.0, 0.0), (0.5, 0.0)),
            (Vec3::new(0.0, 0.0, -1.0), (0.75, 0.5)),
        ];
        for (normal, (eu, ev)) in cases {
            let (u, v) = Sphere::surface_uv(normal);
            assert!((u - eu).abs() < 1e-12, "u for {normal}");
            assert!((v - ev).abs() < 1e-12, "v for {normal}");
        }
    }

    #[test]
    fn moving_sphere_interpolates_and_bounds_both_ends() {
        let sphere = Sphere::moving(
            Point3::zero(),
            Point3::new(2.0, 0.0, 0.0),
            0.0,
            1.0,
            0.5,
            gray(),
        );
        let mid_ray = Ray::new(Point3::new(1.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 0.5);
        let hit = sphere.hit(&mid_ray, 0.001, f64::INFINITY).expect("hits at mid-shutter");
        assert!((hit.t - 4.5).abs() < 1e-9);

        let bbox = sphere.bounding_box(0.0, 1.0).unwrap();
        assert_eq!(bbox.min, Point3::new(-0.5, -0.5, -0.5));
        assert_eq!(bbox.max, Point3::new(2.5, 0.5, 0.5));
    }

    #[test]
    fn zero_width_shutter_treats_sphere_as_stationary() {
        let sphere = Sphere::moving(
            Point3::zero(),
            Point3::new(9.0, 0.0, 0.0),
            0.3,
            0.3,
            1.0,
            gray(),
        );
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 0.3);
        let hit = sphere.hit(&ray, 0.001, f64::INFINITY).expect("hits the start center");
        assert!(hit.t.is_finite());
        assert!((hit.t - 4.0).abs() < 1e-12);
    }

    #[test]
    fn rect_hit_reports_unit_uv() {
        let rect = Rect::xy(-1.0, 1.0, 0.0, 2.0, -3.0, gray());
        let ray = Ray::new(Point3::new(0.5, 1.5, 0.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let hit = rect.hit(&ray, 0.001, f64::INFINITY).expect("hits");
        assert!((hit.t - 3.0).abs() < 1e-12);
        assert!((hit.u - 0.75).abs() < 1e-12);
        assert!((hit.v - 0.75).abs() < 1e-12);
        assert!(ray.direction.dot(hit.normal) <= 0.0);

        let miss = Ray::new(Point3::new(1.5, 1.0, 0.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        assert!(rect.hit(&miss, 0.001, f64::INFINITY).is_none());
    }

    #[test]
    fn rect_parallel_ray_misses() {
        let rect = Rect::xz(-1.0, 1.0, -1.0, 1.0, 0.0, gray());
        let ray = Ray::new(Point3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 0.0);
        assert!(rect.hit(&ray, 0.001, f64::INFINITY).is_none());
    }

    #[test]
    fn displaced_rect_moves_with_shutter_time() {
        let rect = Rect::xy(-1.0, 1.0, -1.0, 1.0, 0.0, gray())
            .with_displacement(Vec3::new(4.0, 0.0, 0.0), 0.0, 1.0);

        let early = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        assert!(rect.hit(&early, 0.001, f64::INFINITY).is_some());

        // by shutter close the rectangle has moved out from under this ray
        let late = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 1.0);
        assert!(rect.hit(&late, 0.001, f64::INFINITY).is_none());
        let chasing = Ray::new(Point3::new(4.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 1.0);
        assert!(rect.hit(&chasing, 0.001, f64::INFINITY).is_some());

        // the bounding box covers the whole sweep
        let bbox = rect.bounding_box(0.0, 1.0).unwrap();
        assert!(bbox.min.x <= -1.0 && bbox.max.x >= 5.0);
    }

    #[test]
    fn cuboid_hits_nearest_face() {
        let cuboid = Cuboid::stationary(
            Point3::new(-1.0, -1.0, -1.0),
            Point3::new(1.0, 1.0, 1.0),
            gray(),
        );
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let hit = cuboid.hit(&ray, 0.001, f64::INFINITY).expect("hits");
        assert!((hit.t - 4.0).abs() < 1e-12);
        assert_eq!(hit.normal, Vec3::new(0.0, 0.0, 1.0));

        let bbox = cuboid.bounding_box(0.0, 1.0).unwrap();
        assert_eq!(bbox.min, Point3::new(-1.0, -1.0, -1.0));
        assert_eq!(bbox.max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn list_returns_the_closest_hit() {
        let mut list = HittableList::new();
        list.add(Arc::new(Sphere::stationary(
            Point3::new(0.0, 0.0, -10.0),
            1.0,
            gray(),
        )));
        list.add(Arc::new(Sphere::stationary(
            Point3::new(0.0, 0.0, -4.0),
            1.0,
            gray(),
        )));

        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let hit = list.hit(&ray, 0.001, f64::INFINITY).expect("hits");
        assert!((hit.t - 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_list_has_no_bounding_box() {
        let list = HittableList::new();
        assert!(list.bounding_box(0.0, 1.0).is_none());
    }
}
