//! # Geometry 模块
//!
//! 场景节点使用的基础几何类型。

use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

/// 三维向量
///
/// 场景是 2D 的，`z` 只用于排序层级，但位移同样作用于它。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Vector {
    /// 创建新的向量
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// 零向量
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// 单位向量 (1, 1, 1)
    pub const fn one() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// 向量长度
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// 归一化
    ///
    /// 零向量保持为零向量。
    pub fn normalised(self) -> Self {
        let length = self.length();
        if length == 0.0 {
            return self;
        }
        Self::new(self.x / length, self.y / length, self.z / length)
    }
}

impl Add for Vector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vector {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl From<(f64, f64, f64)> for Vector {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self::new(x, y, z)
    }
}

impl From<(f64, f64)> for Vector {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y, 0.0)
    }
}

/// 帧的包围盒尺寸
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_ops() {
        let a = Vector::new(1.0, 2.0, 3.0);
        let b = Vector::new(0.5, 0.5, 0.5);

        assert_eq!(a + b, Vector::new(1.5, 2.5, 3.5));
        assert_eq!(a - b, Vector::new(0.5, 1.5, 2.5));
        assert_eq!(a * 2.0, Vector::new(2.0, 4.0, 6.0));

        let mut c = a;
        c += b;
        assert_eq!(c, a + b);
    }

    #[test]
    fn test_vector_length_and_normalise() {
        let v = Vector::new(3.0, 4.0, 0.0);
        assert_eq!(v.length(), 5.0);

        let n = v.normalised();
        assert!((n.length() - 1.0).abs() < 1e-12);
        assert_eq!(n, Vector::new(0.6, 0.8, 0.0));

        // 零向量不产生 NaN
        assert_eq!(Vector::zero().normalised(), Vector::zero());
    }

    #[test]
    fn test_vector_deserialize_missing_axes() {
        let v: Vector = serde_json::from_str(r#"{ "x": 1 }"#).unwrap();
        assert_eq!(v, Vector::new(1.0, 0.0, 0.0));
    }
}
