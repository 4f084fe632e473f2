use serde::{Deserialize, Serialize};
use std::ops::{Mul, Sub};

/// A simple 3D vector struct.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Creates a new Vec3.
    #[inline(always)]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3 { x, y, z }
    }

    /// Creates a zero vector.
    #[inline(always)]
    pub fn zero() -> Self {
        Vec3::new(0.0, 0.0, 0.0)
    }

    /// Calculates the squared length (magnitude) of the vector.
    #[inline(always)]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Calculates the length (magnitude) of the vector.
    #[inline(always)]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    #[inline(always)]
    pub fn scale(self, scalar: f64) -> Self {
        Vec3::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }

    /// Angle between this vector and the +z axis, in radians.
    /// Returns 0.0 for a zero vector.
    pub fn polar_angle(self) -> f64 {
        let len = self.length();
        if len > 0.0 {
            (self.z / len).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        }
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        self.scale(scalar)
    }
}

/// Row-major 3x3 matrix, used for momentum rotations.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat3 {
    pub rows: [[f64; 3]; 3],
}

impl Mat3 {
    /// Right-handed rotation about the x axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Mat3 {
            rows: [[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]],
        }
    }

    /// Right-handed rotation about the z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Mat3 {
            rows: [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    #[inline(always)]
    pub fn mul_vec(&self, v: Vec3) -> Vec3 {
        let r = &self.rows;
        Vec3::new(
            r[0][0] * v.x + r[0][1] * v.y + r[0][2] * v.z,
            r[1][0] * v.x + r[1][1] * v.y + r[1][2] * v.z,
            r[2][0] * v.x + r[2][1] * v.y + r[2][2] * v.z,
        )
    }

    /// Matrix product `self * other`: applying the result to a vector applies
    /// `other` first, then `self`.
    pub fn mul_mat(&self, other: &Mat3) -> Mat3 {
        let mut rows = [[0.0; 3]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.rows[i][k] * other.rows[k][j]).sum();
            }
        }
        Mat3 { rows }
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;
    fn mul(self, v: Vec3) -> Vec3 {
        self.mul_vec(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-12, "{:?} != {:?}", a, b);
    }

    #[test]
    fn rotation_z_quarter_turn_maps_x_to_y() {
        let r = Mat3::rotation_z(FRAC_PI_2);
        assert_close(r * Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn rotation_x_quarter_turn_maps_z_to_minus_y() {
        let r = Mat3::rotation_x(FRAC_PI_2);
        assert_close(r * Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn rotations_preserve_length() {
        let v = Vec3::new(0.3, -1.2, 1.5);
        let r = Mat3::rotation_z(0.7).mul_mat(&Mat3::rotation_x(-0.4));
        assert!((r.mul_vec(v).length() - v.length()).abs() < 1e-12);
    }

    #[test]
    fn mul_mat_applies_right_operand_first() {
        let rx = Mat3::rotation_x(0.3);
        let rz = Mat3::rotation_z(1.1);
        let v = Vec3::new(0.0, 0.0, 2.0);
        assert_close(rz.mul_mat(&rx).mul_vec(v), rz.mul_vec(rx.mul_vec(v)));
    }

    #[test]
    fn polar_angle_of_axis_and_zero() {
        assert_eq!(Vec3::new(0.0, 0.0, 5.0).polar_angle(), 0.0);
        assert_eq!(Vec3::zero().polar_angle(), 0.0);
        assert!((Vec3::new(1.0, 0.0, 0.0).polar_angle() - FRAC_PI_2).abs() < 1e-12);
    }
}
