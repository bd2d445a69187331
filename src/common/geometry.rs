//! Geometric primitives for 2D operations.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use super::float::Real;

/// 2D vector with basic operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2<T> {
    pub x: T,
    pub y: T,
}

impl<T: Real> Vec2<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self::new(T::zero(), T::zero())
    }

    /// Unit vector pointing at angle `theta` from the x axis.
    pub fn from_angle(theta: T) -> Self {
        let (s, c) = theta.sin_cos();
        Self::new(c, s)
    }

    pub fn length(&self) -> T {
        self.length_squared().sqrt()
    }

    pub fn length_squared(&self) -> T {
        self.x * self.x + self.y * self.y
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > T::zero() {
            Self::new(self.x / len, self.y / len)
        } else {
            Self::zero()
        }
    }

    pub fn dot(&self, other: &Self) -> T {
        self.x * other.x + self.y * other.y
    }

    /// z component of the 3D cross product; positive when `other` lies
    /// counterclockwise of `self`.
    pub fn cross(&self, other: &Self) -> T {
        self.x * other.y - self.y * other.x
    }

    /// Rotation by +π/2.
    pub fn perp(&self) -> Self {
        Self::new(-self.y, self.x)
    }

    pub fn angle(&self) -> T {
        self.y.atan2(self.x)
    }

    pub fn distance_to(&self, other: &Self) -> T {
        (*self - *other).length()
    }
}

impl<T: Real> Add for Vec2<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl<T: Real> Sub for Vec2<T> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl<T: Real> Mul<T> for Vec2<T> {
    type Output = Self;

    fn mul(self, scalar: T) -> Self {
        Self::new(self.x * scalar, self.y * scalar)
    }
}

impl<T: Real> Div<T> for Vec2<T> {
    type Output = Self;

    fn div(self, scalar: T) -> Self {
        Self::new(self.x / scalar, self.y / scalar)
    }
}

impl<T: Real> Neg for Vec2<T> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl<T: Real> AddAssign for Vec2<T> {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl<T: Real> SubAssign for Vec2<T> {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
    }
}
