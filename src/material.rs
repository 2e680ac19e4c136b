use crate::hittable::HitRecord;
use crate::math::{Color, Point3, Ray, Vec3};
use crate::texture::Texture;
use rand::Rng;
use std::sync::Arc;

/// The closed set of surface responses, dispatched by match. Materials are
/// immutable, shared across primitives by `Arc` handle, and referenced from
/// hit records by borrow.
///
/// `scatter` importance-samples the BRDF lobe: it returns the scattered ray
/// and the per-channel attenuation, or `None` when the surface absorbs or
/// only emits. Scattered rays inherit the incoming ray's shutter time so
/// secondary bounces see moving geometry at the same instant.
pub enum Material {
    Lambertian { albedo: Arc<Texture> },
    Metal { albedo: Color, fuzz: f64 },
    Dielectric { ior: f64 },
    DiffuseLight { emit: Arc<Texture>, strength: f64 },
    Isotropic { albedo: Arc<Texture> },
}

/// Schlick's polynomial approximation to the Fresnel reflectance:
/// r₀ + (1 − r₀)(1 − cosθ)⁵ with r₀ = ((1 − η)/(1 + η))².
pub(crate) fn schlick_reflectance(cosine: f64, eta_ratio: f64) -> f64 {
    let r0 = ((1.0 - eta_ratio) / (1.0 + eta_ratio)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

impl Material {
    pub fn lambertian(albedo: Color) -> Self {
        Material::Lambertian {
            albedo: Arc::new(Texture::solid(albedo)),
        }
    }

    pub fn lambertian_textured(albedo: Arc<Texture>) -> Self {
        Material::Lambertian { albedo }
    }

    pub fn metal(albedo: Color, fuzz: f64) -> Self {
        Material::Metal {
            albedo,
            fuzz: fuzz.min(1.0),
        }
    }

    pub const fn dielectric(ior: f64) -> Self {
        Material::Dielectric { ior }
    }

    pub fn diffuse_light(emit: Color, strength: f64) -> Self {
        Material::DiffuseLight {
            emit: Arc::new(Texture::solid(emit)),
            strength,
        }
    }

    pub fn diffuse_light_textured(emit: Arc<Texture>, strength: f64) -> Self {
        Material::DiffuseLight { emit, strength }
    }

    pub fn isotropic(albedo: Color) -> Self {
        Material::Isotropic {
            albedo: Arc::new(Texture::solid(albedo)),
        }
    }

    pub fn isotropic_textured(albedo: Arc<Texture>) -> Self {
        Material::Isotropic { albedo }
    }

    pub fn scatter(
        &self,
        ray: &Ray,
        hit: &HitRecord,
        rng: &mut dyn rand::RngCore,
    ) -> Option<(Ray, Color)> {
        match self {
            Material::Lambertian { albedo } => {
                let mut scatter_dir = hit.normal + Vec3::random_unit_vector(rng);
                if scatter_dir.near_zero() {
                    scatter_dir = hit.normal;
                }
                Some((
                    Ray::new(hit.point, scatter_dir, ray.time),
                    albedo.value(hit.u, hit.v, hit.point),
                ))
            }
            Material::Metal { albedo, fuzz } => {
                let reflected = ray.direction.normalized().reflect(hit.normal);
                let scattered = Ray::new(
                    hit.point,
                    reflected + Vec3::random_in_unit_sphere(rng) * *fuzz,
                    ray.time,
                );
                if scattered.direction.dot(hit.normal) > 0.0 {
                    Some((scattered, *albedo))
                } else {
                    None
                }
            }
            Material::Dielectric { ior } => {
                let eta_ratio = if hit.front_face { 1.0 / ior } else { *ior };
                let unit_dir = ray.direction.normalized();
                let cos_theta = (-unit_dir).dot(hit.normal).min(1.0);
                let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

                let cannot_refract = eta_ratio * sin_theta > 1.0;
                let direction = if cannot_refract
                    || schlick_reflectance(cos_theta, eta_ratio) > rng.gen()
                {
                    unit_dir.reflect(hit.normal)
                } else {
                    unit_dir
                        .refract(hit.normal, eta_ratio)
                        .unwrap_or_else(|| unit_dir.reflect(hit.normal))
                };

                Some((Ray::new(hit.point, direction, ray.time), Color::ones()))
            }
            Material::DiffuseLight { .. } => None,
            Material::Isotropic { albedo } => Some((
                Ray::new(hit.point, Vec3::random_in_unit_sphere(rng), ray.time),
                albedo.value(hit.u, hit.v, hit.point),
            )),
        }
    }

    /// Radiance added at the hit regardless of scattering. Zero for every
    /// non-emissive variant.
    pub fn emitted(&self, u: f64, v: f64, point: Point3) -> Color {
        match self {
            Material::DiffuseLight { emit, strength } => emit.value(u, v, point) * *strength,
            _ => Color::zero(),
        }
    }

    /// The characteristic surface color without scattering, consumed by the
    /// auxiliary albedo pass that guides the denoiser.
    pub fn albedo(&self, hit: &HitRecord) -> Color {
        match self {
            Material::Lambertian { albedo } | Material::Isotropic { albedo } => {
                albedo.value(hit.u, hit.v, hit.point)
            }
            Material::Metal { albedo, .. } => *albedo,
            Material::Dielectric { .. } => Color::ones(),
            Material::DiffuseLight { emit, .. } => emit.value(hit.u, hit.v, hit.point),
        }
    }
}
