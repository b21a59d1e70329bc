use std::{fmt::Display, ops};

use ordered_float::OrderedFloat;

/// `0.0` as a complex number.
pub const ZERO: ComplexNumber = ComplexNumber::new(0.0, 0.0);
/// `1.0` as a complex number.
pub const ONE: ComplexNumber = ComplexNumber::new(1.0, 0.0);
/// The imaginary unit `i`.
pub const I: ComplexNumber = ComplexNumber::new(0.0, 1.0);

/// Represents a complex number with real and imaginary parts.
///
/// Every numeric scalar of the language is a `ComplexNumber`; real numbers
/// simply carry a zero imaginary part.
#[derive(Debug, Clone, Copy)]
pub struct ComplexNumber {
    /// The real part of the number.
    pub real:      f64,
    /// The imaginary part of the number.
    pub imaginary: f64,
}

impl Display for ComplexNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.real, self.imaginary) {
            (real, 0.0) => write!(f, "{}", real + 0.0),
            (0.0, imaginary) => write!(f, "{imaginary}i"),
            (real, imaginary) if imaginary > 0.0 => write!(f, "{real} + {imaginary}i"),
            (real, imaginary) => write!(f, "{real} - {}i", -imaginary),
        }
    }
}

impl ComplexNumber {
    /// Constructs a new complex number from real and imaginary components.
    ///
    /// # Example
    /// ```
    /// use quanta::interpreter::value::complex::ComplexNumber;
    /// let c = ComplexNumber::new(5.0, -1.0);
    /// assert_eq!(c.real, 5.0);
    /// assert_eq!(c.imaginary, -1.0);
    /// ```
    #[must_use]
    pub const fn new(real: f64, imaginary: f64) -> Self {
        Self { real, imaginary }
    }

    /// Returns `true` if the imaginary part is exactly zero.
    #[must_use]
    pub const fn is_real(&self) -> bool {
        self.imaginary == 0.0
    }

    /// Returns `true` if both parts are exactly zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.real == 0.0 && self.imaginary == 0.0
    }

    /// Returns `true` if both parts are finite.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.real.is_finite() && self.imaginary.is_finite()
    }

    /// Returns the absolute value (magnitude) of the complex number.
    ///
    /// # Example
    /// ```
    /// use quanta::interpreter::value::complex::ComplexNumber;
    /// let c = ComplexNumber::new(3.0, 4.0);
    /// assert_eq!(c.abs(), 5.0);
    /// ```
    #[must_use]
    pub fn abs(&self) -> f64 {
        self.real.hypot(self.imaginary)
    }

    /// Returns the complex conjugate of the number.
    #[must_use]
    pub const fn conj(&self) -> Self {
        Self { real:      self.real,
               imaginary: -self.imaginary, }
    }

    /// Returns the reciprocal (1/z) of the complex number.
    #[must_use]
    pub const fn recip(&self) -> Self {
        let norm_squared = self.real * self.real + self.imaginary * self.imaginary;

        Self { real:      self.real / norm_squared,
               imaginary: -(self.imaginary / norm_squared), }
    }

    /// Returns the argument (phase angle) in radians.
    ///
    /// # Example
    /// ```
    /// use quanta::interpreter::value::complex::ComplexNumber;
    /// let c = ComplexNumber::new(0.0, 1.0);
    /// assert!((c.arg() - std::f64::consts::FRAC_PI_2).abs() < 1e-10);
    /// ```
    #[must_use]
    pub fn arg(self) -> f64 {
        self.imaginary.atan2(self.real)
    }

    /// Raises the complex number to an integer power by repeated squaring.
    ///
    /// # Example
    /// ```
    /// use quanta::interpreter::value::complex::{ComplexNumber, ONE};
    /// let c = ComplexNumber::new(2.0, 0.0);
    /// assert_eq!(c.powi(0), ONE);
    /// assert_eq!(c.powi(3), ComplexNumber::new(8.0, 0.0));
    /// assert_eq!(c.powi(-1), ComplexNumber::new(0.5, 0.0));
    /// ```
    #[must_use]
    pub fn powi(self, exp: i64) -> Self {
        let mut base = self;
        let mut result = ONE;
        let mut n = exp.unsigned_abs();

        while n > 0 {
            if n % 2 == 1 {
                result *= base;
            }
            base = base * base;
            n /= 2;
        }

        if exp < 0 { result.recip() } else { result }
    }

    /// Raises the complex number to a floating-point power.
    #[must_use]
    pub fn powf(self, exp: f64) -> Self {
        if self.is_zero() {
            return if exp == 0.0 { ONE } else { ZERO };
        }

        let r = self.abs();
        let theta = self.arg();

        let new_r = r.powf(exp);
        let new_theta = theta * exp;

        Self { real:      new_r * new_theta.cos(),
               imaginary: new_r * new_theta.sin(), }
    }

    /// Raises the complex number to a complex power, `exp(w * ln z)`.
    #[must_use]
    pub fn powc(self, exp: Self) -> Self {
        if exp.is_real() {
            return self.powf(exp.real);
        }
        if self.is_zero() {
            return ZERO;
        }
        (self.ln() * exp).exp()
    }

    /// Returns the principal square root of the complex number.
    ///
    /// # Example
    /// ```
    /// use quanta::interpreter::value::complex::ComplexNumber;
    /// let s = ComplexNumber::new(-4.0, 0.0).sqrt();
    /// assert!(s.real.abs() < 1e-10);
    /// assert!((s.imaginary - 2.0).abs() < 1e-10);
    /// ```
    #[must_use]
    pub fn sqrt(self) -> Self {
        let a = self.real;
        let b = self.imaginary;
        let r = a.hypot(b);

        let real = f64::midpoint(r, a).sqrt();
        let imaginary = ((r - a) / 2.0).sqrt().copysign(b);

        Self { real, imaginary }
    }

    /// Returns the sine of the complex number.
    #[must_use]
    pub fn sin(self) -> Self {
        Self { real:      self.real.sin() * self.imaginary.cosh(),
               imaginary: self.real.cos() * self.imaginary.sinh(), }
    }

    /// Returns the cosine of the complex number.
    #[must_use]
    pub fn cos(self) -> Self {
        Self { real:      self.real.cos() * self.imaginary.cosh(),
               imaginary: -self.real.sin() * self.imaginary.sinh(), }
    }

    /// Returns the tangent of the complex number.
    #[must_use]
    pub fn tan(self) -> Self {
        self.sin() / self.cos()
    }

    /// Returns the hyperbolic sine of the complex number.
    #[must_use]
    pub fn sinh(self) -> Self {
        Self { real:      self.real.sinh() * self.imaginary.cos(),
               imaginary: self.real.cosh() * self.imaginary.sin(), }
    }

    /// Returns the hyperbolic cosine of the complex number.
    #[must_use]
    pub fn cosh(self) -> Self {
        Self { real:      self.real.cosh() * self.imaginary.cos(),
               imaginary: self.real.sinh() * self.imaginary.sin(), }
    }

    /// Returns the hyperbolic tangent of the complex number.
    #[must_use]
    pub fn tanh(self) -> Self {
        self.sinh() / self.cosh()
    }

    /// Returns the exponential of the complex number.
    #[must_use]
    pub fn exp(self) -> Self {
        let exp_r = self.real.exp();
        Self { real:      exp_r * self.imaginary.cos(),
               imaginary: exp_r * self.imaginary.sin(), }
    }

    /// Returns the natural logarithm (ln) of the complex number.
    ///
    /// # Example
    /// ```
    /// use quanta::interpreter::value::complex::ComplexNumber;
    /// let ln = ComplexNumber::new(1.0, 0.0).ln();
    /// assert!(ln.real.abs() < 1e-10);
    /// assert!(ln.imaginary.abs() < 1e-10);
    /// ```
    #[must_use]
    pub fn ln(self) -> Self {
        Self { real:      self.abs().ln(),
               imaginary: self.arg(), }
    }
}

impl ops::Neg for ComplexNumber {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self { real:      -self.real,
               imaginary: -self.imaginary, }
    }
}

impl ops::Add for ComplexNumber {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self { real:      self.real + rhs.real,
               imaginary: self.imaginary + rhs.imaginary, }
    }
}

impl ops::Sub for ComplexNumber {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self { real:      self.real - rhs.real,
               imaginary: self.imaginary - rhs.imaginary, }
    }
}

impl ops::Mul for ComplexNumber {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self { real:      self.real
                              .mul_add(rhs.real, -(self.imaginary * rhs.imaginary)),
               imaginary: self.real.mul_add(rhs.imaginary, self.imaginary * rhs.real), }
    }
}

impl ops::MulAssign for ComplexNumber {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl ops::Div for ComplexNumber {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        if rhs.is_real() && self.is_real() {
            return Self::from(self.real / rhs.real);
        }
        let denom = rhs.real.mul_add(rhs.real, rhs.imaginary * rhs.imaginary);
        Self { real:      self.real.mul_add(rhs.real, self.imaginary * rhs.imaginary) / denom,
               imaginary: self.imaginary
                              .mul_add(rhs.real, -(self.real * rhs.imaginary))
                          / denom, }
    }
}

impl<T> From<T> for ComplexNumber where T: Into<f64>
{
    fn from(value: T) -> Self {
        Self { real:      value.into(),
               imaginary: 0.0, }
    }
}

impl PartialEq for ComplexNumber {
    fn eq(&self, other: &Self) -> bool {
        OrderedFloat(self.real) == OrderedFloat(other.real)
        && OrderedFloat(self.imaginary) == OrderedFloat(other.imaginary)
    }
}

impl Eq for ComplexNumber {}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: ComplexNumber, b: ComplexNumber) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn imaginary_unit_squares_to_minus_one() {
        assert!(close(I * I, ComplexNumber::from(-1.0)));
        assert!(close(I.powi(2), ComplexNumber::from(-1.0)));
        assert!(close(I.powf(2.0), ComplexNumber::from(-1.0)));
    }

    #[test]
    fn complex_power_matches_euler() {
        // i^i = e^(-pi/2)
        let value = I.powc(I);
        assert!(close(value, ComplexNumber::from((-std::f64::consts::FRAC_PI_2).exp())));
    }

    #[test]
    fn display_drops_zero_parts() {
        assert_eq!(ComplexNumber::from(3.0).to_string(), "3");
        assert_eq!(ComplexNumber::new(0.0, 2.0).to_string(), "2i");
        assert_eq!(ComplexNumber::new(1.0, -2.0).to_string(), "1 - 2i");
        assert_eq!(ComplexNumber::new(-0.0, 0.0).to_string(), "0");
    }
}
