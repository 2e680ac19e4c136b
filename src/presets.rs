use crate::bvh::BvhNode;
use crate::camera::CameraConfig;
use crate::hittable::{Cuboid, HittableList, Rect, Sphere};
use crate::material::Material;
use crate::math::*;
use crate::renderer::SkyModel;
use crate::texture::Texture;
use crate::transform::{Rotate, Translate};
use crate::volume::ConstantMedium;
use itertools::iproduct;
use rand::rngs::SmallRng;
use rand::Rng;
use std::path::Path;
use std::sync::Arc;

/// A complete scene description bundling geometry, camera, and background.
/// Scene presets let users render showcase images without manual setup; any
/// assembly of primitives into a hittable list is equally valid input.
pub struct SceneDescription {
    pub name: &'static str,
    pub world: HittableList,
    pub camera_config: CameraConfig,
    pub sky: SkyModel,
}

impl SceneDescription {
    /// Wraps the scene in a BVH spanning the camera's shutter interval.
    pub fn into_bvh(self) -> (BvhNode, CameraConfig, SkyModel) {
        let bvh = BvhNode::from_list(
            self.world,
            self.camera_config.shutter_open,
            self.camera_config.shutter_close,
        );
        (bvh, self.camera_config, self.sky)
    }
}

/// Available built-in scene presets.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ScenePreset {
    /// Random moving, diffuse, metal, and glass spheres on a checkered ground.
    Showcase,
    /// Two giant checkered spheres touching at the origin.
    Checker,
    /// Two marble spheres shaded by Perlin turbulence.
    Perlin,
    /// An image-textured globe (expects assets/earthmap.jpg).
    Earth,
    /// The Cornell box with an area light and two rotated boxes.
    Cornell,
    /// The Cornell box filled with two constant-density media.
    Smoke,
    /// Everything at once: box terrain, motion blur, media, textures.
    Final,
}

impl ScenePreset {
    /// Builds the preset. All randomness comes from the seeded setup
    /// generator, so a fixed `--seed` reproduces the same geometry.
    pub fn build(self, rng: &mut SmallRng) -> SceneDescription {
        match self {
            ScenePreset::Showcase => build_showcase(rng),
            ScenePreset::Checker => build_checker(),
            ScenePreset::Perlin => build_perlin(rng),
            ScenePreset::Earth => build_earth(),
            ScenePreset::Cornell => build_cornell(),
            ScenePreset::Smoke => build_smoke(),
            ScenePreset::Final => build_final(rng),
        }
    }
}

fn looking_from(look_from: Point3, look_at: Point3, vfov_degrees: f64) -> CameraConfig {
    CameraConfig {
        look_from,
        look_at,
        vfov_degrees,
        ..CameraConfig::default()
    }
}

fn build_showcase(rng: &mut SmallRng) -> SceneDescription {
    let mut world = HittableList::new();

    // Ground — dark/light checker
    world.add(Arc::new(Sphere::stationary(
        Point3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Material::lambertian_textured(Arc::new(Texture::checker(
            Color::new(0.15, 0.15, 0.15),
            Color::new(0.95, 0.85, 0.85),
            10.0,
        )))),
    )));

    // Random small spheres; diffuse ones bounce upward during the shutter
    for (a, b) in iproduct!(-11..11, -11..11) {
        let choose_mat: f64 = rng.gen();
        let center = Point3::new(
            a as f64 + 0.9 * rng.gen::<f64>(),
            0.2,
            b as f64 + 0.9 * rng.gen::<f64>(),
        );

        if (center - Point3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
            continue;
        }

        if choose_mat < 0.8 {
            let albedo = Color::new(
                rng.gen::<f64>() * rng.gen::<f64>(),
                rng.gen::<f64>() * rng.gen::<f64>(),
                rng.gen::<f64>() * rng.gen::<f64>(),
            );
            let drift = Point3::new(0.0, rng.gen_range(0.0..0.5), 0.0);
            world.add(Arc::new(Sphere::moving(
                center,
                center + drift,
                0.0,
                1.0,
                0.2,
                Arc::new(Material::lambertian(albedo)),
            )));
        } else if choose_mat < 0.95 {
            let albedo = Color::new(
                rng.gen_range(0.5..1.0),
                rng.gen_range(0.5..1.0),
                rng.gen_range(0.5..1.0),
            );
            let fuzz = rng.gen_range(0.0..0.5);
            world.add(Arc::new(Sphere::stationary(
                center,
                0.2,
                Arc::new(Material::metal(albedo, fuzz)),
            )));
        } else {
            world.add(Arc::new(Sphere::stationary(
                center,
                0.2,
                Arc::new(Material::dielectric(1.5)),
            )));
        }
    }

    // A turbulent sun hanging over the field
    world.add(Arc::new(Sphere::stationary(
        Point3::new(1.5, 7.0, 0.0),
        5.0,
        Arc::new(Material::diffuse_light_textured(
            Arc::new(Texture::noise(1.0, rng)),
            0.9,
        )),
    )));

    // Three hero spheres
    world.add(Arc::new(Sphere::stationary(
        Point3::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Material::dielectric(1.5)),
    )));
    world.add(Arc::new(Sphere::stationary(
        Point3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Material::lambertian_textured(Arc::new(Texture::noise(
            4.0, rng,
        )))),
    )));
    world.add(Arc::new(Sphere::stationary(
        Point3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Material::metal(Color::new(0.7, 0.6, 0.5), 0.0)),
    )));

    SceneDescription {
        name: "Showcase",
        world,
        camera_config: CameraConfig {
            aperture: 0.1,
            ..looking_from(Point3::new(13.0, 2.0, 3.0), Point3::zero(), 20.0)
        },
        sky: SkyModel::Gradient {
            horizon: Color::ones(),
            zenith: Color::new(0.5, 0.7, 1.0),
        },
    }
}

fn build_checker() -> SceneDescription {
    let mut world = HittableList::new();

    let checker = Arc::new(Texture::checker(
        Color::new(0.2, 0.3, 0.1),
        Color::new(0.9, 0.9, 0.9),
        10.0,
    ));
    let surface = Arc::new(Material::lambertian_textured(checker));

    world.add(Arc::new(Sphere::stationary(
        Point3::new(0.0, 10.0, 0.0),
        10.0,
        surface.clone(),
    )));
    world.add(Arc::new(Sphere::stationary(
        Point3::new(0.0, -10.0, 0.0),
        10.0,
        surface,
    )));

    SceneDescription {
        name: "Checker",
        world,
        camera_config: looking_from(Point3::new(13.0, 2.0, 3.0), Point3::zero(), 20.0),
        sky: SkyModel::Solid(Color::new(0.7, 0.8, 1.0)),
    }
}

fn build_perlin(rng: &mut SmallRng) -> SceneDescription {
    let mut world = HittableList::new();

    let marble = Arc::new(Material::lambertian_textured(Arc::new(Texture::noise(
        4.0, rng,
    ))));
    world.add(Arc::new(Sphere::stationary(
        Point3::new(0.0, -1000.0, 0.0),
        1000.0,
        marble.clone(),
    )));
    world.add(Arc::new(Sphere::stationary(
        Point3::new(0.0, 2.0, 0.0),
        2.0,
        marble,
    )));

    SceneDescription {
        name: "Perlin",
        world,
        camera_config: looking_from(Point3::new(13.0, 2.0, 3.0), Point3::zero(), 20.0),
        sky: SkyModel::Solid(Color::new(0.7, 0.8, 1.0)),
    }
}

fn build_earth() -> SceneDescription {
    let mut world = HittableList::new();

    let globe_texture = Arc::new(Texture::image(Path::new("assets/earthmap.jpg")));
    world.add(Arc::new(Sphere::stationary(
        Point3::zero(),
        2.0,
        Arc::new(Material::lambertian_textured(globe_texture)),
    )));

    SceneDescription {
        name: "Earth",
        world,
        camera_config: looking_from(Point3::new(13.0, 2.0, 3.0), Point3::zero(), 20.0),
        sky: SkyModel::Solid(Color::new(0.7, 0.8, 1.0)),
    }
}

/// The five walls and the area light shared by the Cornell presets.
fn cornell_shell(world: &mut HittableList, light_strength: f64) {
    let red = Arc::new(Material::lambertian(Color::new(0.65, 0.05, 0.05)));
    let green = Arc::new(Material::lambertian(Color::new(0.12, 0.45, 0.15)));
    let white = Arc::new(Material::lambertian(Color::new(0.73, 0.73, 0.73)));
    let light = Arc::new(Material::diffuse_light(Color::ones(), light_strength));

    world.add(Arc::new(Rect::yz(0.0, 555.0, 0.0, 555.0, 555.0, green)));
    world.add(Arc::new(Rect::yz(0.0, 555.0, 0.0, 555.0, 0.0, red)));
    world.add(Arc::new(Rect::xz(100.0, 455.0, 100.0, 455.0, 554.0, light)));
    world.add(Arc::new(Rect::xz(0.0, 555.0, 0.0, 555.0, 0.0, white.clone())));
    world.add(Arc::new(Rect::xz(0.0, 555.0, 0.0, 555.0, 555.0, white.clone())));
    world.add(Arc::new(Rect::xy(0.0, 555.0, 0.0, 555.0, 555.0, white)));
}

/// The two interior boxes, rotated about y and pushed into place.
fn cornell_boxes() -> (Arc<dyn crate::hittable::Hittable>, Arc<dyn crate::hittable::Hittable>) {
    let white = Arc::new(Material::lambertian(Color::new(0.73, 0.73, 0.73)));

    let tall = Arc::new(Translate::new(
        Arc::new(Rotate::new(
            Arc::new(Cuboid::stationary(
                Point3::zero(),
                Point3::new(165.0, 330.0, 165.0),
                white.clone(),
            )),
            Vec3::new(0.0, 15.0, 0.0),
        )),
        Vec3::new(265.0, 0.0, 295.0),
    ));
    let short = Arc::new(Translate::new(
        Arc::new(Rotate::new(
            Arc::new(Cuboid::stationary(
                Point3::zero(),
                Point3::new(165.0, 165.0, 165.0),
                white,
            )),
            Vec3::new(0.0, -18.0, 0.0),
        )),
        Vec3::new(130.0, 0.0, 65.0),
    ));
    (tall, short)
}

fn cornell_camera() -> CameraConfig {
    CameraConfig {
        aspect_ratio: 1.0,
        focus_dist: 800.0,
        ..looking_from(
            Point3::new(278.0, 278.0, -800.0),
            Point3::new(278.0, 278.0, 0.0),
            40.0,
        )
    }
}

fn build_cornell() -> SceneDescription {
    let mut world = HittableList::new();
    cornell_shell(&mut world, 4.0);
    let (tall, short) = cornell_boxes();
    world.add(tall);
    world.add(short);

    SceneDescription {
        name: "Cornell Box",
        world,
        camera_config: cornell_camera(),
        sky: SkyModel::Black,
    }
}

fn build_smoke() -> SceneDescription {
    let mut world = HittableList::new();
    cornell_shell(&mut world, 7.0);
    let (tall, short) = cornell_boxes();

    world.add(Arc::new(ConstantMedium::new(tall, 0.01, Color::zero())));
    world.add(Arc::new(ConstantMedium::new(short, 0.01, Color::ones())));

    SceneDescription {
        name: "Cornell Smoke",
        world,
        camera_config: cornell_camera(),
        sky: SkyModel::Black,
    }
}

fn build_final(rng: &mut SmallRng) -> SceneDescription {
    let mut world = HittableList::new();

    // Terrain — a grid of ground boxes with random heights
    let ground = Arc::new(Material::lambertian(Color::new(0.48, 0.83, 0.53)));
    let mut terrain = HittableList::new();
    for (i, j) in iproduct!(0..20, 0..20) {
        let w = 100.0;
        let x0 = -1000.0 + i as f64 * w;
        let z0 = -1000.0 + j as f64 * w;
        let y1 = rng.gen_range(1.0..101.0);
        terrain.add(Arc::new(Cuboid::stationary(
            Point3::new(x0, 0.0, z0),
            Point3::new(x0 + w, y1, z0 + w),
            ground.clone(),
        )));
    }
    world.add(Arc::new(BvhNode::from_list(terrain, 0.0, 1.0)));

    // Ceiling light that drifts sideways across the exposure
    let light = Arc::new(Material::diffuse_light(Color::ones(), 7.0));
    world.add(Arc::new(
        Rect::xz(123.0, 423.0, 147.0, 412.0, 554.0, light)
            .with_displacement(Vec3::new(30.0, 0.0, 0.0), 0.0, 1.0),
    ));

    // Motion-blurred orange sphere
    let start = Point3::new(400.0, 400.0, 200.0);
    world.add(Arc::new(Sphere::moving(
        start,
        start + Vec3::new(30.0, 0.0, 0.0),
        0.0,
        1.0,
        50.0,
        Arc::new(Material::lambertian(Color::new(0.7, 0.3, 0.1))),
    )));

    // Glass and brushed metal
    world.add(Arc::new(Sphere::stationary(
        Point3::new(260.0, 150.0, 45.0),
        50.0,
        Arc::new(Material::dielectric(1.5)),
    )));
    world.add(Arc::new(Sphere::stationary(
        Point3::new(0.0, 150.0, 145.0),
        50.0,
        Arc::new(Material::metal(Color::new(0.8, 0.8, 0.9), 1.0)),
    )));

    // Subsurface look: glass shell filled with a dense blue medium
    let shell = Arc::new(Sphere::stationary(
        Point3::new(360.0, 150.0, 145.0),
        70.0,
        Arc::new(Material::dielectric(1.5)),
    ));
    world.add(shell.clone());
    world.add(Arc::new(ConstantMedium::new(
        shell,
        0.2,
        Color::new(0.2, 0.4, 0.9),
    )));

    // Thin global mist
    let mist_boundary = Arc::new(Sphere::stationary(
        Point3::zero(),
        5000.0,
        Arc::new(Material::dielectric(1.5)),
    ));
    world.add(Arc::new(ConstantMedium::textured(
        mist_boundary,
        0.0001,
        Arc::new(Texture::solid(Color::ones())),
    )));

    // Textured globes
    world.add(Arc::new(Sphere::stationary(
        Point3::new(400.0, 200.0, 400.0),
        100.0,
        Arc::new(Material::lambertian_textured(Arc::new(Texture::image(
            Path::new("assets/earthmap.jpg"),
        )))),
    )));
    world.add(Arc::new(Sphere::stationary(
        Point3::new(220.0, 280.0, 300.0),
        80.0,
        Arc::new(Material::lambertian_textured(Arc::new(Texture::noise(
            0.1, rng,
        )))),
    )));

    // A rotated, translated cluster of small white spheres
    let white = Arc::new(Material::lambertian(Color::new(0.73, 0.73, 0.73)));
    let mut cluster = HittableList::new();
    for _ in 0..1000 {
        cluster.add(Arc::new(Sphere::stationary(
            Point3::new(
                rng.gen_range(0.0..165.0),
                rng.gen_range(0.0..165.0),
                rng.gen_range(0.0..165.0),
            ),
            10.0,
            white.clone(),
        )));
    }
    world.add(Arc::new(Translate::new(
        Arc::new(Rotate::new(
            Arc::new(BvhNode::from_list(cluster, 0.0, 1.0)),
            Vec3::new(0.0, 15.0, 0.0),
        )),
        Vec3::new(-100.0, 270.0, 395.0),
    )));

    SceneDescription {
        name: "Final",
        world,
        camera_config: CameraConfig {
            aspect_ratio: 1.0,
            focus_dist: 600.0,
            ..looking_from(
                Point3::new(478.0, 278.0, -600.0),
                Point3::new(278.0, 278.0, 0.0),
                40.0,
            )
        },
        sky: SkyModel::Black,
    }
}
