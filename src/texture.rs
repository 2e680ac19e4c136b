use crate::math::{Color, Point3, Vec3};
use rand::Rng;
use std::path::Path;
use std::sync::Arc;

// ─── Perlin Noise Generator ─────────────────────────────────────────────────

const POINT_COUNT: usize = 256;

/// Value-gradient Perlin noise over a 256-entry lattice of random unit
/// vectors, addressed through three independent coordinate permutations.
/// `noise` is smoothed with the Hermite fade curve and lies in [-1, 1];
/// `turbulence` is the absolute fractal sum (weights halving, positions
/// doubling each octave) and is always non-negative.
pub struct Perlin {
    random_vectors: [Vec3; POINT_COUNT],
    perm_x: [usize; POINT_COUNT],
    perm_y: [usize; POINT_COUNT],
    perm_z: [usize; POINT_COUNT],
}

impl Perlin {
    pub fn new(rng: &mut dyn rand::RngCore) -> Self {
        let mut random_vectors = [Vec3::zero(); POINT_COUNT];
        for slot in random_vectors.iter_mut() {
            *slot = Vec3::random_unit_vector(rng);
        }
        Self {
            random_vectors,
            perm_x: Self::generate_perm(rng),
            perm_y: Self::generate_perm(rng),
            perm_z: Self::generate_perm(rng),
        }
    }

    fn generate_perm(rng: &mut dyn rand::RngCore) -> [usize; POINT_COUNT] {
        let mut perm = [0usize; POINT_COUNT];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = i;
        }
        for i in (1..POINT_COUNT).rev() {
            let target = rng.gen_range(0..=i);
            perm.swap(i, target);
        }
        perm
    }

    pub fn noise(&self, point: Point3) -> f64 {
        let u = point.x - point.x.floor();
        let v = point.y - point.y.floor();
        let w = point.z - point.z.floor();

        let i = point.x.floor() as i64;
        let j = point.y.floor() as i64;
        let k = point.z.floor() as i64;

        let mut corners = [[[Vec3::zero(); 2]; 2]; 2];
        for (di, plane) in corners.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, cell) in row.iter_mut().enumerate() {
                    let ix = self.perm_x[((i + di as i64) & 255) as usize];
                    let iy = self.perm_y[((j + dj as i64) & 255) as usize];
                    let iz = self.perm_z[((k + dk as i64) & 255) as usize];
                    *cell = self.random_vectors[ix ^ iy ^ iz];
                }
            }
        }

        Self::trilinear_interpolate(&corners, u, v, w)
    }

    /// Fractal turbulence: |Σ noise(2ⁱ·p) / 2ⁱ| over `depth` octaves.
    pub fn turbulence(&self, point: Point3, depth: u32) -> f64 {
        let mut accum = 0.0;
        let mut p = point;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(p);
            weight *= 0.5;
            p *= 2.0;
        }

        accum.abs()
    }

    fn trilinear_interpolate(corners: &[[[Vec3; 2]; 2]; 2], u: f64, v: f64, w: f64) -> f64 {
        // Hermite fade removes the lattice-aligned banding of plain trilinear
        let fade = |t: f64| t * t * (3.0 - 2.0 * t);
        let uu = fade(u);
        let vv = fade(v);
        let ww = fade(w);

        let mut accum = 0.0;
        for (i, plane) in corners.iter().enumerate() {
            for (j, row) in plane.iter().enumerate() {
                for (k, cell) in row.iter().enumerate() {
                    let (fi, fj, fk) = (i as f64, j as f64, k as f64);
                    let weight_vec = Vec3::new(u - fi, v - fj, w - fk);
                    accum += (fi * uu + (1.0 - fi) * (1.0 - uu))
                        * (fj * vv + (1.0 - fj) * (1.0 - vv))
                        * (fk * ww + (1.0 - fk) * (1.0 - ww))
                        * cell.dot(weight_vec);
                }
            }
        }
        accum
    }
}

// ─── Image Raster ───────────────────────────────────────────────────────────

const BYTES_PER_PIXEL: usize = 3;

/// An 8-bit-per-channel RGB raster sampled by (u, v) lookup.
pub struct ImageData {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl ImageData {
    /// Wraps raw RGB8 bytes, row-major, top row first.
    /// Panics if the byte count does not match width × height × 3.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Self {
        assert_eq!(data.len(), width * height * BYTES_PER_PIXEL);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn load(path: &Path) -> image::ImageResult<Self> {
        let rgb = image::open(path)?.to_rgb8();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);
        Ok(Self::from_raw(width, height, rgb.into_raw()))
    }

    /// Nearest-pixel lookup. u and v are clamped to [0, 1], v is flipped so
    /// v = 1 is the top of the image, and pixel indices are clamped to the
    /// last row/column so u = 1 or v = 0 stay in bounds.
    fn sample(&self, u: f64, v: f64) -> Color {
        let u = u.clamp(0.0, 1.0);
        let v = 1.0 - v.clamp(0.0, 1.0);

        let x = ((u * self.width as f64) as usize).min(self.width - 1);
        let y = ((v * self.height as f64) as usize).min(self.height - 1);

        let index = y * self.width * BYTES_PER_PIXEL + x * BYTES_PER_PIXEL;
        Color::new(
            self.data[index] as f64 / 255.0,
            self.data[index + 1] as f64 / 255.0,
            self.data[index + 2] as f64 / 255.0,
        )
    }
}

// ─── Texture ────────────────────────────────────────────────────────────────

/// The closed set of texture variants. Textures are immutable and shared by
/// reference-counted handle between materials.
pub enum Texture {
    Solid(Color),
    Checker {
        even: Arc<Texture>,
        odd: Arc<Texture>,
        scale: f64,
    },
    Noise {
        perlin: Perlin,
        scale: f64,
    },
    Image(ImageData),
}

impl Texture {
    pub const fn solid(color: Color) -> Self {
        Texture::Solid(color)
    }

    pub fn checker(even: Color, odd: Color, scale: f64) -> Self {
        Texture::Checker {
            even: Arc::new(Texture::Solid(even)),
            odd: Arc::new(Texture::Solid(odd)),
            scale,
        }
    }

    pub fn noise(scale: f64, rng: &mut dyn rand::RngCore) -> Self {
        Texture::Noise {
            perlin: Perlin::new(rng),
            scale,
        }
    }

    /// Loads an image texture. A missing or unreadable file is reported once
    /// here and replaced by solid magenta, so the render proceeds with an
    /// obviously wrong color instead of aborting.
    pub fn image(path: &Path) -> Self {
        match ImageData::load(path) {
            Ok(data) => Texture::Image(data),
            Err(err) => {
                log::error!(
                    "failed to load texture image {}: {err}; substituting magenta",
                    path.display()
                );
                Texture::Solid(Color::new(1.0, 0.0, 1.0))
            }
        }
    }

    pub fn value(&self, u: f64, v: f64, point: Point3) -> Color {
        match self {
            Texture::Solid(color) => *color,
            Texture::Checker { even, odd, scale } => {
                let sines = (scale * point.x).sin()
                    * (scale * point.y).sin()
                    * (scale * point.z).sin();
                if sines < 0.0 {
                    odd.value(u, v, point)
                } else {
                    even.value(u, v, point)
                }
            }
            // Marble: turbulence phase-shifts a sine stripe along z
            Texture::Noise { perlin, scale } => {
                Color::ones() * 0.5 * (1.0 + (scale * point.z + 10.0 * perlin.turbulence(point, 7)).sin())
            }
            Texture::Image(data) => data.sample(u, v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn solid_ignores_coordinates() {
        let t = Texture::solid(Color::new(0.2, 0.4, 0.6));
        let a = t.value(0.0, 0.0, Point3::zero());
        let b = t.value(0.9, 0.1, Point3::new(5.0, -3.0, 2.0));
        assert_eq!(a, b);
    }

    #[test]
    fn checker_alternates_across_octants() {
        let even = Color::ones();
        let odd = Color::zero();
        let t = Texture::checker(even, odd, 10.0);
        // all three sines positive
        assert_eq!(t.value(0.0, 0.0, Point3::new(0.05, 0.05, 0.05)), even);
        // one sine flips sign
        assert_eq!(t.value(0.0, 0.0, Point3::new(0.05, 0.05, -0.05)), odd);
    }

    #[test]
    fn perlin_noise_stays_in_unit_band() {
        let mut rng = SmallRng::seed_from_u64(11);
        let perlin = Perlin::new(&mut rng);
        for i in -20..20 {
            for j in -20..20 {
                let p = Point3::new(i as f64 * 0.37, j as f64 * 0.73, (i + j) as f64 * 0.19);
                let n = perlin.noise(p);
                assert!((-1.0..=1.0).contains(&n), "noise {n} out of band at {p}");
                assert!(perlin.turbulence(p, 7) >= 0.0);
            }
        }
    }

    #[test]
    fn noise_texture_is_displayable() {
        let mut rng = SmallRng::seed_from_u64(3);
        let t = Texture::noise(4.0, &mut rng);
        for i in 0..50 {
            let c = t.value(0.0, 0.0, Point3::new(i as f64 * 0.11, 0.3, -0.7 * i as f64));
            for channel in [c.x, c.y, c.z] {
                assert!((0.0..=1.0).contains(&channel));
            }
        }
    }

    #[test]
    fn image_lookup_flips_v_and_clamps() {
        // 2x2 raster: top row red | green, bottom row blue | white
        let data = vec![
            255, 0, 0, 0, 255, 0, //
            0, 0, 255, 255, 255, 255,
        ];
        let t = Texture::Image(ImageData::from_raw(2, 2, data));
        let red = Color::new(1.0, 0.0, 0.0);
        let green = Color::new(0.0, 1.0, 0.0);
        let blue = Color::new(0.0, 0.0, 1.0);
        let white = Color::ones();

        assert_eq!(t.value(0.0, 1.0, Point3::zero()), red);
        assert_eq!(t.value(0.0, 0.0, Point3::zero()), blue);
        // u = 1 and v out of range clamp onto the last column / row
        assert_eq!(t.value(1.0, 1.0, Point3::zero()), green);
        assert_eq!(t.value(2.0, -3.0, Point3::zero()), white);
    }
}
