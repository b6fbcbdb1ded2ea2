use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::ops::{Add, Div, Mul, Sub};

/// Three-component vector over a numeric type.
///
/// Used with `f64` for points and distances in real space [m] and with
/// `usize` for integer cell coordinates. Equality is only defined for the
/// integer variant; comparing floating-point vectors must be done with an
/// explicit tolerance at the call site.
#[derive(Clone, Copy, Debug)]
pub struct Vec3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T> Vec3<T> {
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }

    /// Vector with the same value in every component
    pub const fn splat(value: T) -> Self
    where
        T: Copy,
    {
        Self {
            x: value,
            y: value,
            z: value,
        }
    }
}

impl<T: Copy + Mul<Output = T>> Vec3<T> {
    /// Product of the components (for a dimension triple: the cell count)
    pub fn product(&self) -> T {
        self.x * self.y * self.z
    }

    /// Hadamard/Schur product (element-wise product)
    pub fn elem_product(&self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }
}

impl<T: Copy + Div<Output = T>> Vec3<T> {
    /// Element-wise division with another vector
    pub fn elem_division(&self, rhs: Self) -> Self {
        Self::new(self.x / rhs.x, self.y / rhs.y, self.z / rhs.z)
    }
}

// Scalar operations apply the constant to every component.

impl<T: Copy + Add<Output = T>> Add<T> for Vec3<T> {
    type Output = Self;
    fn add(self, rhs: T) -> Self {
        Self::new(self.x + rhs, self.y + rhs, self.z + rhs)
    }
}

impl<T: Copy + Sub<Output = T>> Sub<T> for Vec3<T> {
    type Output = Self;
    fn sub(self, rhs: T) -> Self {
        Self::new(self.x - rhs, self.y - rhs, self.z - rhs)
    }
}

impl<T: Copy + Mul<Output = T>> Mul<T> for Vec3<T> {
    type Output = Self;
    fn mul(self, rhs: T) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl<T: Copy + Div<Output = T>> Div<T> for Vec3<T> {
    type Output = Self;
    fn div(self, rhs: T) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl<T: Add<Output = T>> Add for Vec3<T> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl<T: Sub<Output = T>> Sub for Vec3<T> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Vec3<usize> {
    /// Element-wise absolute value. `usize` is unsigned already, so this is
    /// the identity.
    pub fn elem_abs(&self) -> Self {
        *self
    }

    /// Convert integer cell coordinates to a real vector
    pub fn cast_f64(&self) -> Vec3<f64> {
        Vec3::new(self.x as f64, self.y as f64, self.z as f64)
    }
}

impl PartialEq for Vec3<usize> {
    fn eq(&self, other: &Self) -> bool {
        (self.x, self.y, self.z) == (other.x, other.y, other.z)
    }
}

impl Eq for Vec3<usize> {}

impl Vec3<f64> {
    /// Element-wise absolute value
    pub fn elem_abs(&self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Element-wise ceiling
    pub fn elem_ceil(&self) -> Self {
        Self::new(self.x.ceil(), self.y.ceil(), self.z.ceil())
    }

    /// Truncating conversion to integer cell coordinates. Components must be
    /// non-negative.
    pub fn cast_usize(&self) -> Vec3<usize> {
        Vec3::new(self.x as usize, self.y as usize, self.z as usize)
    }

    /// Squared euclidean norm (squared vector length)
    pub fn norm_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Euclidean norm (vector length)
    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Euclidean distance from the endpoint of this vector to another
    pub fn distance(&self, rhs: Self) -> f64 {
        (*self - rhs).norm()
    }

    /// Dot product with another vector
    pub fn dot(&self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Cross product with another vector
    pub fn cross(&self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    /// Cosine similarity with another vector
    pub fn cosine_similarity(&self, rhs: Self) -> f64 {
        self.dot(rhs) / (self.norm() * rhs.norm())
    }

    /// Angle [rad] formed by rays to `a` and `b`, with this vector as the
    /// vertex point. Principal branch of arccos.
    pub fn cosine_angle(&self, a: Self, b: Self) -> f64 {
        (a - *self).cosine_similarity(b - *self).acos()
    }

    /// Componentwise linear interpolation between `self` and `end`
    pub fn lerp(&self, end: Self, t: Self) -> Self {
        Self::new(
            self.x + (end.x - self.x) * t.x,
            self.y + (end.y - self.y) * t.y,
            self.z + (end.z - self.z) * t.z,
        )
    }

    /// Round each component to the nearest `origin + k·step` lattice value
    /// (k integer).
    pub fn snap_to_nearest_component_wise_integer_step(&self, origin: Self, step: Self) -> Self {
        Self::new(
            origin.x + ((self.x - origin.x) / step.x).round() * step.x,
            origin.y + ((self.y - origin.y) / step.y).round() * step.y,
            origin.z + ((self.z - origin.z) / step.z).round() * step.z,
        )
    }
}

// JSON form is a 3-element array, matching the export metadata schema.

impl<T: Serialize> Serialize for Vec3<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.x, &self.y, &self.z).serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Vec3<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (x, y, z) = <(T, T, T)>::deserialize(deserializer)?;
        Ok(Self::new(x, y, z))
    }
}
