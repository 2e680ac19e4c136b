use crate::hittable::{HitRecord, Hittable, HittableList};
use crate::math::{Aabb, Point3, Ray};
use std::cmp::Ordering;
use std::sync::Arc;

/// A bounding volume hierarchy over a set of hittables.
///
/// Construction cycles the split axis round-robin (x → y → z → x …), sorts
/// the set by the lower corner of each child's bounding box on that axis,
/// and splits at the median. A single-object partition becomes a `Leaf`
/// rather than a node with two aliased children, which sidesteps the
/// shared-child bookkeeping entirely.
///
/// Every node's box is the exact union of its children's boxes over the
/// shutter interval the tree was built for. A child without a bounding box
/// is reported once at construction and pinned under a degenerate
/// equal-corner box, which fails every slab test, so that child simply
/// never receives intersection queries.
pub enum BvhNode {
    Leaf {
        object: Arc<dyn Hittable>,
        bbox: Aabb,
    },
    Interior {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
}

impl BvhNode {
    pub fn from_list(list: HittableList, t_start: f64, t_end: f64) -> Self {
        Self::build(list.into_objects(), t_start, t_end, 0)
    }

    fn build(mut objects: Vec<Arc<dyn Hittable>>, t_start: f64, t_end: f64, axis: usize) -> Self {
        match objects.len() {
            0 => panic!("BVH built over an empty object set"),
            1 => Self::leaf(objects.pop().unwrap(), t_start, t_end),
            2 => {
                let second = objects.pop().unwrap();
                let first = objects.pop().unwrap();
                let (left, right) =
                    if Self::compare(&first, &second, t_start, t_end, axis) == Ordering::Greater {
                        (second, first)
                    } else {
                        (first, second)
                    };
                Self::interior(
                    Self::leaf(left, t_start, t_end),
                    Self::leaf(right, t_start, t_end),
                )
            }
            _ => {
                objects.sort_by(|a, b| Self::compare(a, b, t_start, t_end, axis));
                let right_objects = objects.split_off(objects.len() / 2);
                let next_axis = (axis + 1) % 3;
                Self::interior(
                    Self::build(objects, t_start, t_end, next_axis),
                    Self::build(right_objects, t_start, t_end, next_axis),
                )
            }
        }
    }

    fn leaf(object: Arc<dyn Hittable>, t_start: f64, t_end: f64) -> Self {
        let bbox = match object.bounding_box(t_start, t_end) {
            Some(bbox) => bbox,
            None => {
                log::error!(
                    "hittable without a bounding box supplied to a BVH; it will never be hit"
                );
                Aabb::new(Point3::zero(), Point3::zero())
            }
        };
        BvhNode::Leaf { object, bbox }
    }

    fn interior(left: BvhNode, right: BvhNode) -> Self {
        let bbox = Aabb::surrounding(&left.bbox(), &right.bbox());
        BvhNode::Interior {
            left: Box::new(left),
            right: Box::new(right),
            bbox,
        }
    }

    fn compare(
        a: &Arc<dyn Hittable>,
        b: &Arc<dyn Hittable>,
        t_start: f64,
        t_end: f64,
        axis: usize,
    ) -> Ordering {
        let corner = |object: &Arc<dyn Hittable>| {
            object
                .bounding_box(t_start, t_end)
                .map_or(0.0, |bbox| bbox.min[axis])
        };
        corner(a)
            .partial_cmp(&corner(b))
            .unwrap_or(Ordering::Equal)
    }

    fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bbox, .. } | BvhNode::Interior { bbox, .. } => *bbox,
        }
    }
}

impl Hittable for BvhNode {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord<'_>> {
        match self {
            BvhNode::Leaf { object, bbox } => {
                if !bbox.hit(ray, t_min, t_max) {
                    return None;
                }
                object.hit(ray, t_min, t_max)
            }
            BvhNode::Interior { left, right, bbox } => {
                if !bbox.hit(ray, t_min, t_max) {
                    return None;
                }
                let hit_left = left.hit(ray, t_min, t_max);
                // the right subtree only needs to beat the left's closest hit
                let pruned_max = hit_left.as_ref().map_or(t_max, |hit| hit.t);
                let hit_right = right.hit(ray, t_min, pruned_max);
                hit_right.or(hit_left)
            }
        }
    }

    fn bounding_box(&self, _t_start: f64, _t_end: f64) -> Option<Aabb> {
        Some(self.bbox())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::Sphere;
    use crate::material::Material;
    use crate::math::{Color, Vec3};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn gray() -> Arc<Material> {
        Arc::new(Material::lambertian(Color::new(0.5, 0.5, 0.5)))
    }

    fn build_pair() -> (HittableList, BvhNode) {
        let spheres: Vec<Arc<dyn Hittable>> = vec![
            Arc::new(Sphere::stationary(Point3::new(0.0, 0.0, -1.0), 1.0, gray())),
            Arc::new(Sphere::stationary(Point3::new(5.0, 0.0, -1.0), 1.0, gray())),
        ];
        let mut list = HittableList::new();
        let mut bvh_input = HittableList::new();
        for sphere in &spheres {
            list.add(sphere.clone());
            bvh_input.add(sphere.clone());
        }
        (list, BvhNode::from_list(bvh_input, 0.0, 1.0))
    }

    #[test]
    fn two_sphere_tree_routes_rays_to_the_right_children() {
        let (_, bvh) = build_pair();
        let down_z = Vec3::new(0.0, 0.0, -1.0);

        let first = bvh
            .hit(&Ray::new(Point3::zero(), down_z, 0.0), 0.001, f64::INFINITY)
            .expect("hits the near sphere");
        assert!(first.point.x.abs() < 1e-9);

        let second = bvh
            .hit(
                &Ray::new(Point3::new(5.0, 0.0, 0.0), down_z, 0.0),
                0.001,
                f64::INFINITY,
            )
            .expect("hits the far sphere");
        assert!((second.point.x - 5.0).abs() < 1e-9);

        assert!(bvh
            .hit(
                &Ray::new(Point3::new(2.5, 0.0, 0.0), down_z, 0.0),
                0.001,
                f64::INFINITY,
            )
            .is_none());
    }

    #[test]
    fn traversal_agrees_with_the_linear_scan() {
        let mut rng = SmallRng::seed_from_u64(31);
        let mut list = HittableList::new();
        let mut bvh_input = HittableList::new();
        for i in -3..3 {
            for j in -3..3 {
                let center = Point3::new(
                    i as f64 * 2.0 + rng.gen_range(-0.5..0.5),
                    rng.gen_range(-1.0..1.0),
                    j as f64 * 2.0 - 10.0,
                );
                let sphere: Arc<dyn Hittable> =
                    Arc::new(Sphere::stationary(center, rng.gen_range(0.2..0.8), gray()));
                list.add(sphere.clone());
                bvh_input.add(sphere);
            }
        }
        let bvh = BvhNode::from_list(bvh_input, 0.0, 1.0);

        for sx in -8..8 {
            for sy in -4..4 {
                let direction =
                    Vec3::new(sx as f64 * 0.4, sy as f64 * 0.4, -10.0).normalized();
                let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), direction, 0.0);
                let linear = list.hit(&ray, 0.001, f64::INFINITY);
                let tree = bvh.hit(&ray, 0.001, f64::INFINITY);
                match (linear, tree) {
                    (Some(a), Some(b)) => assert!((a.t - b.t).abs() < 1e-9),
                    (None, None) => {}
                    (a, b) => panic!(
                        "BVH disagreement: linear {:?} vs tree {:?}",
                        a.map(|h| h.t),
                        b.map(|h| h.t)
                    ),
                }
            }
        }
    }

    #[test]
    fn tree_box_covers_a_moving_sphere_sweep() {
        let mut input = HittableList::new();
        input.add(Arc::new(Sphere::moving(
            Point3::new(0.0, 0.0, -5.0),
            Point3::new(4.0, 0.0, -5.0),
            0.0,
            1.0,
            1.0,
            gray(),
        )));
        let bvh = BvhNode::from_list(input, 0.0, 1.0);

        // at shutter close the sphere sits at x = 4; the tree must still find it
        let ray = Ray::new(Point3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0), 1.0);
        assert!(bvh.hit(&ray, 0.001, f64::INFINITY).is_some());
    }

    struct Boundless {
        material: Material,
    }

    impl Hittable for Boundless {
        fn hit(&self, ray: &Ray, t_min: f64, _t_max: f64) -> Option<HitRecord<'_>> {
            let t = t_min + 0.5;
            let mut rec = HitRecord {
                point: ray.at(t),
                normal: Vec3::unit_y(),
                t,
                u: 0.0,
                v: 0.0,
                front_face: true,
                material: &self.material,
            };
            rec.set_face_normal(ray, Vec3::unit_y());
            Some(rec)
        }

        fn bounding_box(&self, _t_start: f64, _t_end: f64) -> Option<Aabb> {
            None
        }
    }

    #[test]
    fn boxless_children_are_pruned_rather_than_crashing() {
        let mut input = HittableList::new();
        input.add(Arc::new(Boundless {
            material: Material::lambertian(Color::ones()),
        }));
        input.add(Arc::new(Sphere::stationary(
            Point3::new(0.0, 0.0, -5.0),
            1.0,
            gray(),
        )));
        let bvh = BvhNode::from_list(input, 0.0, 1.0);

        // the boxless child would claim t ≈ 0.5; the BVH must never surface it
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let hit = bvh.hit(&ray, 0.001, f64::INFINITY).expect("sphere still visible");
        assert!((hit.t - 4.0).abs() < 1e-9);
    }
}
