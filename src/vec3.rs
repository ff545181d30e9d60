use crate::rand_gen::{RandGen, RandStream};

/// Struct for representing a 3D vector in Cartesian coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vector<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T> Vector<T> {
    pub const fn new(x: T, y: T, z: T) -> Vector<T> {
        Vector { x, y, z }
    }

    /// Creates a 3D vector from the given spherical coordinates.
    /// # Arguments
    /// * `radius` - The radius (magnitude) of the vector, in range \[0, ∞\]
    /// * `theta` - Angle of inclination, in the range \[0, 𝜋\]
    /// * `phi` - Azimuth angle, in the range \[0, 2𝜋\]
    /// # Comments
    /// * `radius` is allowed to be negative, but if it is, then the vector will face in the opposite direction
    pub fn from_spherical(radius: T, theta: T, phi: T) -> Vector<T>
    where
        T: num::traits::Float,
    {
        let (sin_theta, cos_theta) = theta.sin_cos();
        let (sin_phi, cos_phi) = phi.sin_cos();
        Vector {
            x: cos_phi * sin_theta,
            y: sin_phi * sin_theta,
            z: cos_theta,
        } * radius
    }

    pub fn dot(&self, other: &Self) -> T
    where
        T: std::ops::Mul<Output = T> + std::ops::Add<Output = T> + Copy,
    {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self
    where
        T: std::ops::Mul<Output = T> + std::ops::Sub<Output = T> + Copy,
    {
        Vector {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn angle(&self, other: &Self) -> T
    where
        T: num::traits::Float,
    {
        let cos = self.dot(other) / (self.mag() * other.mag());
        cos.max(-T::one()).min(T::one()).acos()
    }

    pub fn mag_sq(&self) -> T
    where
        T: std::ops::Mul<Output = T> + std::ops::Add<Output = T> + Copy,
    {
        self.dot(self)
    }

    pub fn mag(&self) -> T
    where
        T: num::traits::Float,
    {
        self.mag_sq().sqrt()
    }

    pub fn normalized(&self) -> Self
    where
        T: num::traits::Float,
    {
        *self / self.mag()
    }

    /// Like [Vector::normalized], but refuses zero-length and non-finite
    /// vectors instead of producing NaNs.
    pub fn try_normalized(&self) -> Option<Self>
    where
        T: num::traits::Float,
    {
        let mag = self.mag();
        if mag.is_finite() && mag > T::zero() {
            Some(*self / mag)
        } else {
            None
        }
    }

    /// Builds two unit vectors that, together with this unit vector, form a
    /// right-handed orthonormal basis `(u, v, self)`.
    ///
    /// Construction from Duff et al., "Building an Orthonormal
    /// Basis, Revisited" (JCGT 2017). `self` must already be normalized.
    pub fn orthonormal_basis(&self) -> (Self, Self)
    where
        T: num::traits::Float,
    {
        let one = T::one();
        let sign = if self.z >= T::zero() { one } else { -one };
        let a = -one / (sign + self.z);
        let b = self.x * self.y * a;
        let u = Vector {
            x: one + sign * self.x * self.x * a,
            y: sign * b,
            z: -sign * self.x,
        };
        let v = Vector {
            x: b,
            y: sign + self.y * self.y * a,
            z: -self.y,
        };
        (u, v)
    }

    /// Maps a vector given in a local frame whose z axis is `self` into the
    /// global frame. `self` must be a unit vector.
    pub fn from_local_frame(&self, local: &Self) -> Self
    where
        T: num::traits::Float,
    {
        let (u, v) = self.orthonormal_basis();
        u * local.x + v * local.y + *self * local.z
    }

    /// Generates a random unit vector, uniformly over the sphere, using
    /// Marsaglia's rejection method.
    pub fn random_isotropic_normed(stream: &mut RandStream) -> Vector<T>
    where
        T: RandGen + num::traits::Float,
    {
        let one = T::one();
        let two = one + one;
        let mut rhosq: T;
        let mut u: T;
        let mut v: T;
        while {
            u = T::rand(stream) * two - one;
            v = T::rand(stream) * two - one;
            rhosq = u * u + v * v;
            rhosq > one
        } {}
        let sqrt_part = (one - rhosq).sqrt();
        Vector {
            x: one - two * rhosq,
            y: two * u * sqrt_part,
            z: two * v * sqrt_part,
        }
    }
}

impl<T> std::ops::Add for Vector<T>
where
    T: std::ops::Add<Output = T>,
{
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl<T> std::ops::AddAssign for Vector<T>
where
    T: std::ops::AddAssign,
{
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl<T> std::ops::Sub for Vector<T>
where
    T: std::ops::Sub<Output = T>,
{
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl<T> std::ops::Div<T> for Vector<T>
where
    T: std::ops::Div<Output = T> + Copy,
{
    type Output = Self;

    fn div(self, rhs: T) -> Self {
        Self {
            x: self.x / rhs,
            y: self.y / rhs,
            z: self.z / rhs,
        }
    }
}

impl<T> std::ops::Mul<T> for Vector<T>
where
    T: std::ops::Mul<Output = T> + Copy,
{
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
        }
    }
}

impl<T> std::ops::Neg for Vector<T>
where
    T: std::ops::Neg<Output = T>,
{
    type Output = Vector<T>;

    fn neg(self) -> Self::Output {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

pub type Vectord = Vector<f64>;
