use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::parameter::SimulationParameter;
use crate::vec3::Vec3;

/// One idealized circular piston source radiating a monochromatic wave.
/// Immutable for the lifetime of a job.
#[derive(Clone, Serialize, Deserialize)]
pub struct Transducer {
    /// Public name or id
    pub id: String,
    /// Center of the radiating surface [m]
    pub position: Vec3<f64>,
    /// Point the transducer is aimed at; defines the axis of the directivity
    /// pattern [m]
    pub target: Vec3<f64>,
    /// Radius of the radiating surface [m]
    pub radius: f64,
    /// Phase offset of the excitation [rad]
    pub phase_shift: f64,
    /// Transmission efficiency [dimensionless, 0-1]
    pub loss_factor: f64,
    /// Drive amplitude [dimensionless, 0-1]. The physical scale of the
    /// resulting pressure is up to the caller.
    pub output_power: f64,
    /// Excitation frequency [Hz]. Falls back to the field-wide frequency of
    /// the simulation parameter when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
}

impl Transducer {
    /// Check physical plausibility. Returns `Ok(())` if the parameters are
    /// valid, `Err(message)` naming the first violated constraint otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if self.radius <= 0.0 {
            return Err("Radius is not positive".to_string());
        }
        if self.loss_factor < 0.0 || self.loss_factor > 1.0 {
            return Err("Loss factor is not in range 0 and 1".to_string());
        }
        if self.output_power < 0.0 || self.output_power > 1.0 {
            return Err("Output power is not in range 0 and 1".to_string());
        }
        if let Some(frequency) = self.frequency {
            if frequency <= 0.0 {
                return Err("Transducer frequency is not positive".to_string());
            }
        }

        Ok(())
    }

    /// Complex pressure contribution of this transducer at `point`.
    ///
    /// Far-field piston source: `exp(i·(k·d + φ)) · P·L·D(θ) / d` where `d`
    /// is the distance from the transducer, `k` the wave number and `D` the
    /// directivity below. Singular when `point` coincides with the
    /// transducer position; the pipeline keeps the sampling region away from
    /// the sources.
    pub fn pressure_at(&self, point: Vec3<f64>, parameter: &SimulationParameter) -> Complex64 {
        let angle = self.position.cosine_angle(self.target, point);
        let dist = self.position.distance(point);

        let frequency = self.frequency.unwrap_or(parameter.frequency);
        let wave_number = 2.0 * PI * frequency / parameter.air_wave_speed;

        let directivity = directivity(wave_number * self.radius * angle.sin());
        let amplitude = self.output_power * self.loss_factor * directivity / dist;

        Complex64::from_polar(amplitude, wave_number * dist + self.phase_shift)
    }
}

/// Directivity of a circular piston, `2·J₁(x)/x`, continued with its limit 1
/// at `x = 0` (on axis).
fn directivity(x: f64) -> f64 {
    if x == 0.0 {
        return 1.0;
    }
    2.0 * libm::j1(x) / x
}
