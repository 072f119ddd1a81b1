//! Operator overloads. Every combination of owned/borrowed series and `f64`
//! maps onto `Series::zip_with`, so watermarks follow the element-wise rule.

use std::ops::{Add, Div, Mul, Neg, Sub};

use super::{safe_div, Series};

macro_rules! series_binop {
    ($trait:ident, $method:ident, $f:expr) => {
        impl $trait<&Series> for &Series {
            type Output = Series;
            fn $method(self, rhs: &Series) -> Series {
                self.zip_with(rhs, $f)
            }
        }

        impl $trait<Series> for &Series {
            type Output = Series;
            fn $method(self, rhs: Series) -> Series {
                self.zip_with(&rhs, $f)
            }
        }

        impl $trait<&Series> for Series {
            type Output = Series;
            fn $method(self, rhs: &Series) -> Series {
                (&self).zip_with(rhs, $f)
            }
        }

        impl $trait<Series> for Series {
            type Output = Series;
            fn $method(self, rhs: Series) -> Series {
                (&self).zip_with(&rhs, $f)
            }
        }

        impl $trait<f64> for &Series {
            type Output = Series;
            fn $method(self, rhs: f64) -> Series {
                self.zip_with(rhs, $f)
            }
        }

        impl $trait<f64> for Series {
            type Output = Series;
            fn $method(self, rhs: f64) -> Series {
                (&self).zip_with(rhs, $f)
            }
        }

        impl $trait<&Series> for f64 {
            type Output = Series;
            fn $method(self, rhs: &Series) -> Series {
                rhs.zip_with(self, |a, b| ($f)(b, a))
            }
        }

        impl $trait<Series> for f64 {
            type Output = Series;
            fn $method(self, rhs: Series) -> Series {
                (&rhs).zip_with(self, |a, b| ($f)(b, a))
            }
        }
    };
}

series_binop!(Add, add, |a: f64, b: f64| a + b);
series_binop!(Sub, sub, |a: f64, b: f64| a - b);
series_binop!(Mul, mul, |a: f64, b: f64| a * b);
series_binop!(Div, div, safe_div);

impl Neg for &Series {
    type Output = Series;
    fn neg(self) -> Series {
        self.map(|v| -v)
    }
}

impl Neg for Series {
    type Output = Series;
    fn neg(self) -> Series {
        (&self).map(|v| -v)
    }
}
