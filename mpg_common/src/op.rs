/// Generates the boilerplate operator impls for single-field newtypes.
///
/// `op!(binary Usd, Add, add)` expands to an `impl Add for Usd` that forwards to the inner value,
/// and similarly for `inplace` (`AddAssign` and friends) and `unary` (`Neg`).
#[macro_export]
macro_rules! op {
    (binary $name:ident, $trait:ident, $fn:ident) => {
        impl std::ops::$trait for $name {
            type Output = Self;

            fn $fn(self, rhs: Self) -> Self::Output {
                Self(std::ops::$trait::$fn(self.0, rhs.0))
            }
        }
    };
    (inplace $name:ident, $trait:ident, $fn:ident) => {
        impl std::ops::$trait for $name {
            fn $fn(&mut self, rhs: Self) {
                std::ops::$trait::$fn(&mut self.0, rhs.0)
            }
        }
    };
    (unary $name:ident, $trait:ident, $fn:ident) => {
        impl std::ops::$trait for $name {
            type Output = Self;

            fn $fn(self) -> Self::Output {
                Self(std::ops::$trait::$fn(self.0))
            }
        }
    };
}
