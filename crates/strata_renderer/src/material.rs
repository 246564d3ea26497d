//! Surface materials and the scatter capability.

use strata_math::{Ray, Vec3};

use crate::hittable::HitRecord;
use crate::sampler::Sampler;

/// Color type alias (linear RGB, channels typically in 0-1)
pub type Color = Vec3;

/// Outcome of a ray scattering off a surface.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    /// Per-channel fraction of the incoming light that survives the bounce
    pub attenuation: Color,
    /// The continuation ray
    pub scattered: Ray,
}

/// Describes how light interacts with a surface.
///
/// Implementations must be read-only: a single material is shared by every
/// worker thread for the whole render.
pub trait Scatter: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, sampler: &mut Sampler) -> Option<ScatterResult>;
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }
}

impl Scatter for Lambertian {
    fn scatter(&self, _ray_in: &Ray, rec: &HitRecord, sampler: &mut Sampler) -> Option<ScatterResult> {
        let mut scatter_direction = rec.normal + sampler.in_unit_sphere();

        // Catch degenerate scatter direction
        if scatter_direction.length_squared() < 1e-8 {
            scatter_direction = rec.normal;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, scatter_direction),
        })
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }

    pub fn fuzz(&self) -> f32 {
        self.fuzz
    }
}

impl Scatter for Metal {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, sampler: &mut Sampler) -> Option<ScatterResult> {
        let reflected = reflect(ray_in.direction().normalize(), rec.normal);
        let direction = reflected + self.fuzz * sampler.unit_vector();

        // Fuzz pushed the ray below the surface
        if direction.dot(rec.normal) <= 0.0 {
            return None;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, direction),
        })
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }

    pub fn ior(&self) -> f32 {
        self.ior
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f32, ratio: f32) -> f32 {
        let r0 = ((1.0 - ratio) / (1.0 + ratio)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Scatter for Dielectric {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, sampler: &mut Sampler) -> Option<ScatterResult> {
        let refraction_ratio = if rec.front_face { 1.0 / self.ior } else { self.ior };

        let unit_direction = ray_in.direction().normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        // Total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction = if cannot_refract
            || Self::reflectance(cos_theta, refraction_ratio) > sampler.gen_f32()
        {
            reflect(unit_direction, rec.normal)
        } else {
            refract(unit_direction, rec.normal, refraction_ratio)
        };

        Some(ScatterResult {
            attenuation: Color::ONE,
            scattered: Ray::new(rec.p, direction),
        })
    }
}

/// The closed set of materials a sphere can carry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    Lambertian(Lambertian),
    Metal(Metal),
    Dielectric(Dielectric),
}

impl Material {
    pub fn lambertian(albedo: Color) -> Self {
        Material::Lambertian(Lambertian::new(albedo))
    }

    pub fn metal(albedo: Color, fuzz: f32) -> Self {
        Material::Metal(Metal::new(albedo, fuzz))
    }

    pub fn dielectric(ior: f32) -> Self {
        Material::Dielectric(Dielectric::new(ior))
    }
}

impl Scatter for Material {
    #[inline]
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, sampler: &mut Sampler) -> Option<ScatterResult> {
        match self {
            Material::Lambertian(m) => m.scatter(ray_in, rec, sampler),
            Material::Metal(m) => m.scatter(ray_in, rec, sampler),
            Material::Dielectric(m) => m.scatter(ray_in, rec, sampler),
        }
    }
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface with the given eta ratio.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record<'a>(material: &'a Material, normal: Vec3, front_face: bool) -> HitRecord<'a> {
        HitRecord {
            p: Vec3::ZERO,
            normal,
            t: 1.0,
            front_face,
            material,
        }
    }

    #[test]
    fn test_lambertian_attenuation_is_albedo() {
        let albedo = Color::new(0.4, 0.2, 0.1);
        let material = Material::lambertian(albedo);
        let rec = record(&material, Vec3::Y, true);
        let ray_in = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let mut sampler = Sampler::new(1);

        for _ in 0..500 {
            let result = material
                .scatter(&ray_in, &rec, &mut sampler)
                .expect("lambertian never absorbs");
            assert_eq!(result.attenuation, albedo);
            // Bounce stays in the normal's hemisphere (or on it)
            assert!(result.scattered.direction().dot(rec.normal) >= 0.0);
        }
    }

    #[test]
    fn test_metal_attenuation_bounded_by_albedo() {
        let albedo = Color::new(0.7, 0.6, 0.5);
        let material = Material::metal(albedo, 0.5);
        let rec = record(&material, Vec3::Y, true);
        let ray_in = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let mut sampler = Sampler::new(2);

        for _ in 0..500 {
            if let Some(result) = material.scatter(&ray_in, &rec, &mut sampler) {
                assert!(result.attenuation.cmple(albedo).all());
                assert!(result.scattered.direction().dot(rec.normal) > 0.0);
            }
        }
    }

    #[test]
    fn test_mirror_reflects_exactly() {
        let material = Material::metal(Color::ONE, 0.0);
        let rec = record(&material, Vec3::Y, true);
        let ray_in = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let mut sampler = Sampler::new(3);

        let result = material.scatter(&ray_in, &rec, &mut sampler).unwrap();
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!((result.scattered.direction() - expected).length() < 1e-5);
    }

    #[test]
    fn test_metal_absorbs_below_surface() {
        // Normal facing along the ray: the reflection points into the surface
        let material = Material::metal(Color::ONE, 0.0);
        let rec = record(&material, Vec3::Z, true);
        let ray_in = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::Z);
        let mut sampler = Sampler::new(4);

        assert!(material.scatter(&ray_in, &rec, &mut sampler).is_none());
    }

    #[test]
    fn test_dielectric_attenuation_is_exactly_one() {
        let material = Material::dielectric(1.5);
        let rec = record(&material, Vec3::Z, true);
        let ray_in = Ray::new(Vec3::new(0.3, 0.0, 1.0), Vec3::new(-0.3, 0.0, -1.0));
        let mut sampler = Sampler::new(5);

        for _ in 0..500 {
            let result = material
                .scatter(&ray_in, &rec, &mut sampler)
                .expect("glass never absorbs");
            assert_eq!(result.attenuation, Color::ONE);
        }
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        // Leaving glass at a grazing angle: ratio * sin_theta > 1
        let material = Material::dielectric(1.5);
        let rec = record(&material, Vec3::Z, false);
        let direction = Vec3::new(1.0, 0.0, -0.2).normalize();
        let ray_in = Ray::new(Vec3::ZERO, direction);
        let mut sampler = Sampler::new(6);

        for _ in 0..50 {
            let result = material.scatter(&ray_in, &rec, &mut sampler).unwrap();
            let expected = reflect(direction, Vec3::Z);
            assert!((result.scattered.direction() - expected).length() < 1e-6);
        }
    }

    #[test]
    fn test_refract_straight_through() {
        let refracted = refract(-Vec3::Z, Vec3::Z, 1.0 / 1.5);
        assert!((refracted - -Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_schlick_grows_at_grazing_angles() {
        let head_on = Dielectric::reflectance(1.0, 1.0 / 1.5);
        let grazing = Dielectric::reflectance(0.05, 1.0 / 1.5);
        assert!((head_on - 0.04).abs() < 1e-3);
        assert!(grazing > head_on);
    }

    #[test]
    fn test_metal_fuzz_clamped() {
        assert_eq!(Metal::new(Color::ONE, 3.0).fuzz(), 1.0);
        assert_eq!(Metal::new(Color::ONE, -1.0).fuzz(), 0.0);
    }
}
