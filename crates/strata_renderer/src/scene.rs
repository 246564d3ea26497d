//! Procedural sphere field scene.
//!
//! A large ground sphere, a 22x22 grid of small randomized spheres and three
//! large feature spheres (glass, diffuse, metal).

use strata_math::Vec3;

use crate::hittable::HittableList;
use crate::material::Material;
use crate::sampler::Sampler;
use crate::sphere::Sphere;
use crate::Color;

/// Radius of the small grid spheres.
pub const SMALL_RADIUS: f32 = 0.2;

/// Small spheres closer than this to a feature sphere's footprint are skipped.
pub const FEATURE_CLEARANCE: f32 = 0.9;

/// Centers of the three feature spheres at small-sphere height.
pub const FEATURE_FOOTPRINTS: [Vec3; 3] = [
    Vec3::new(0.0, SMALL_RADIUS, 0.0),
    Vec3::new(-4.0, SMALL_RADIUS, 0.0),
    Vec3::new(4.0, SMALL_RADIUS, 0.0),
];

/// Build the scene's spheres in enumeration order.
///
/// The ground comes first and the three feature spheres last.
pub fn random_spheres(sampler: &mut Sampler) -> Vec<Sphere> {
    let mut spheres = Vec::with_capacity(22 * 22 + 4);

    // Ground
    spheres.push(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Material::lambertian(Color::new(0.5, 0.5, 0.5)),
    ));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = sampler.gen_f32();
            let center = Vec3::new(
                a as f32 + 0.9 * sampler.gen_f32(),
                SMALL_RADIUS,
                b as f32 + 0.9 * sampler.gen_f32(),
            );

            let clear = FEATURE_FOOTPRINTS
                .iter()
                .all(|feature| (center - *feature).length() > FEATURE_CLEARANCE);
            if !clear {
                continue;
            }

            let material = if choose_mat < 0.8 {
                // Diffuse
                let albedo = sampler.color() * sampler.color();
                Material::lambertian(albedo)
            } else if choose_mat < 0.95 {
                // Metal
                let albedo = 0.5 * (Color::ONE + sampler.color());
                let fuzz = 0.5 * sampler.gen_f32();
                Material::metal(albedo, fuzz)
            } else {
                // Glass
                Material::dielectric(1.5)
            };

            spheres.push(Sphere::new(center, SMALL_RADIUS, material));
        }
    }

    // Three feature spheres
    spheres.push(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, Material::dielectric(1.5)));
    spheres.push(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Material::lambertian(Color::new(0.4, 0.2, 0.1)),
    ));
    spheres.push(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Material::metal(Color::new(0.7, 0.6, 0.5), 0.0),
    ));

    spheres
}

/// Build the scene as a hittable aggregate.
pub fn random_scene(sampler: &mut Sampler) -> HittableList {
    let spheres = random_spheres(sampler);
    log::debug!("Built scene with {} spheres", spheres.len());
    spheres.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Dielectric, Lambertian, Metal};

    #[test]
    fn test_layout_ground_first_features_last() {
        let spheres = random_spheres(&mut Sampler::new(1));

        let ground = &spheres[0];
        assert_eq!(ground.center(), Vec3::new(0.0, -1000.0, 0.0));
        assert_eq!(ground.radius(), 1000.0);

        let features = &spheres[spheres.len() - 3..];
        assert_eq!(*features[0].material(), Material::Dielectric(Dielectric::new(1.5)));
        assert_eq!(
            *features[1].material(),
            Material::Lambertian(Lambertian::new(Color::new(0.4, 0.2, 0.1)))
        );
        assert_eq!(
            *features[2].material(),
            Material::Metal(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0))
        );
        assert!(features.iter().all(|s| s.radius() == 1.0));
    }

    #[test]
    fn test_small_spheres_clear_of_features() {
        for seed in 0..8 {
            let spheres = random_spheres(&mut Sampler::new(seed));
            let small = &spheres[1..spheres.len() - 3];

            assert!(small.len() <= 22 * 22);
            for sphere in small {
                assert_eq!(sphere.radius(), SMALL_RADIUS);
                for feature in FEATURE_FOOTPRINTS {
                    assert!((sphere.center() - feature).length() > FEATURE_CLEARANCE);
                }
            }
        }
    }

    #[test]
    fn test_small_sphere_material_ranges() {
        let spheres = random_spheres(&mut Sampler::new(3));
        let small = &spheres[1..spheres.len() - 3];

        for sphere in small {
            match sphere.material() {
                Material::Lambertian(m) => {
                    assert!(m.albedo().cmpge(Color::ZERO).all() && m.albedo().cmplt(Color::ONE).all());
                }
                Material::Metal(m) => {
                    assert!(m.albedo().cmpge(Color::splat(0.5)).all());
                    assert!(m.albedo().cmple(Color::ONE).all());
                    assert!((0.0..=0.5).contains(&m.fuzz()));
                }
                Material::Dielectric(m) => assert_eq!(m.ior(), 1.5),
            }
        }
    }

    #[test]
    fn test_material_mix_is_mostly_diffuse() {
        let mut counts = [0usize; 3];
        for seed in 0..10 {
            let spheres = random_spheres(&mut Sampler::new(seed));
            for sphere in &spheres[1..spheres.len() - 3] {
                let slot = match sphere.material() {
                    Material::Lambertian(_) => 0,
                    Material::Metal(_) => 1,
                    Material::Dielectric(_) => 2,
                };
                counts[slot] += 1;
            }
        }

        let total: usize = counts.iter().sum();
        let diffuse = counts[0] as f32 / total as f32;
        let metal = counts[1] as f32 / total as f32;
        assert!((0.75..0.85).contains(&diffuse), "diffuse share {}", diffuse);
        assert!((0.11..0.19).contains(&metal), "metal share {}", metal);
        assert!(counts[2] > 0);
    }

    #[test]
    fn test_same_seed_same_scene() {
        let a = random_spheres(&mut Sampler::new(42));
        let b = random_spheres(&mut Sampler::new(42));
        assert_eq!(a, b);
        assert_eq!(random_scene(&mut Sampler::new(42)).len(), a.len());
    }
}
