use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::vec3::Vec3;

fn default_assume_large_particle_density() -> bool {
    true
}

/// Everything the pipeline needs besides the transducer list. Immutable for
/// the lifetime of a job.
#[derive(Clone, Serialize, Deserialize)]
pub struct SimulationParameter {
    /// One corner of the sampling region [m]
    pub begin: Vec3<f64>,
    /// Opposite corner of the sampling region [m]
    pub end: Vec3<f64>,
    /// Edge length of a grid cell [m]
    pub cell_size: f64,
    /// Excitation frequency shared by all transducers [Hz]
    pub frequency: f64,
    /// Density of the propagation medium [kg/m³]
    pub air_density: f64,
    /// Speed of sound in the propagation medium [m/s]
    pub air_wave_speed: f64,
    /// Radius of the probe particle [m]
    pub particle_radius: f64,
    /// Density of the probe particle [kg/m³]. Ignored when
    /// `assume_large_particle_density` is set.
    pub particle_density: f64,
    /// Speed of sound inside the probe particle [m/s]. Ignored when
    /// `assume_large_particle_density` is set.
    pub particle_wave_speed: f64,
    /// Approximate the particle terms as if density and wave speed approach
    /// infinity (solid dense particles in air)
    #[serde(default = "default_assume_large_particle_density")]
    pub assume_large_particle_density: bool,
}

impl SimulationParameter {
    /// Check physical plausibility. Returns `Ok(())` if the parameters are
    /// valid, `Err(message)` naming the first violated constraint otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if self.cell_size <= 0.0 {
            return Err("Cell size is not positive".to_string());
        }
        if self.frequency <= 0.0 {
            return Err("Frequency is not positive".to_string());
        }
        if self.air_density <= 0.0 {
            return Err("Air density is not positive".to_string());
        }
        if self.air_wave_speed <= 0.0 {
            return Err("Air wave speed is not positive".to_string());
        }
        if self.particle_radius <= 0.0 {
            return Err("Particle radius is not positive".to_string());
        }
        if !self.assume_large_particle_density && self.particle_density <= 0.0 {
            return Err("Particle density is not positive".to_string());
        }
        if !self.assume_large_particle_density && self.particle_wave_speed <= 0.0 {
            return Err("Particle wave speed is not positive".to_string());
        }

        Ok(())
    }

    /// Volume of the probe particle [m³]
    pub fn particle_volume(&self) -> f64 {
        (4.0 / 3.0) * PI * self.particle_radius.powi(3)
    }

    /// Angular frequency ω = 2π·f [rad/s]
    pub fn angular_frequency(&self) -> f64 {
        2.0 * PI * self.frequency
    }

    /// Wavelength in the medium [m]
    pub fn wavelength(&self) -> f64 {
        self.air_wave_speed / self.frequency
    }

    /// Gor'kov pressure coefficient k1, weighting `|p|²` in the potential.
    ///
    /// `V/(4·ρ_a·c_a²)` under the large-particle-density assumption,
    /// `V·(1/(ρ_a·c_a²) − 1/(ρ_p·c_p²))/4` otherwise.
    pub fn k1(&self) -> f64 {
        let volume = self.particle_volume();
        let medium = self.air_density * self.air_wave_speed * self.air_wave_speed;

        if self.assume_large_particle_density {
            return volume / medium / 4.0;
        }

        let particle =
            self.particle_density * self.particle_wave_speed * self.particle_wave_speed;
        volume * (1.0 / medium - 1.0 / particle) / 4.0
    }

    /// Gor'kov velocity coefficient k2, weighting `|∇p|²` in the potential.
    ///
    /// `−(3V/4)/(2·ω²·ρ_a)` under the large-particle-density assumption,
    /// `(3V/4)·(ρ_a − ρ_p)/(ρ_a·(ρ_a + 2·ρ_p)·ω²)` otherwise.
    pub fn k2(&self) -> f64 {
        let volume_term = self.particle_volume() * 3.0 / 4.0;
        let omega = self.angular_frequency();
        let medium = omega * omega * self.air_density;

        if self.assume_large_particle_density {
            return volume_term / medium / -2.0;
        }

        let density_sum = self.air_density + 2.0 * self.particle_density;
        let density_diff = self.air_density - self.particle_density;
        volume_term * (density_diff / (density_sum * medium))
    }
}
