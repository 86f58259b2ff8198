use crate::params::{OTS_BYTES, OTS_PK_BYTES, TREE_MAX_ARITY};
use crate::{Error, Result};
use std::cmp::Ordering;

/// Byte size of an unprefixed tree signature with the given shape.
pub const fn signature_bytes(depth: usize, width: usize) -> usize {
    OTS_BYTES + depth * (width * OTS_PK_BYTES + OTS_BYTES + 1)
}

/// Depth and width of a signature tree.
///
/// Every level holds `width` one-time keys, and a signature walks `depth` levels below
/// the root key, so a tree can issue `width^depth` signatures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TreeShape {
    depth: u8,
    width: u8,
}

impl TreeShape {
    /// # Errors
    ///
    /// Returns [`Error::InvalidShape`] unless both `depth` and `width` lie in
    /// `1..=TREE_MAX_ARITY`.
    pub fn new(depth: usize, width: usize) -> Result<Self> {
        if !(1..=TREE_MAX_ARITY).contains(&depth) {
            return Err(Error::InvalidShape(format!(
                "depth {depth} outside 1..={TREE_MAX_ARITY}"
            )));
        }
        if !(1..=TREE_MAX_ARITY).contains(&width) {
            return Err(Error::InvalidShape(format!(
                "width {width} outside 1..={TREE_MAX_ARITY}"
            )));
        }
        Ok(Self {
            depth: depth as u8,
            width: width as u8,
        })
    }

    /// Picks the shape with the largest capacity whose signatures fit in
    /// `max_signature_bytes`.
    ///
    /// Candidates are scanned by ascending depth, then ascending width, and only a
    /// strictly larger capacity replaces the current best, so ties resolve to the first
    /// shape found.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BudgetTooSmall`] if not even a `1 x 1` tree fits.
    pub fn from_budget(max_signature_bytes: usize) -> Result<Self> {
        let mut best: Option<(TreeShape, Capacity)> = None;

        for depth in 1..=TREE_MAX_ARITY {
            if signature_bytes(depth, 1) > max_signature_bytes {
                break;
            }
            for width in 1..=TREE_MAX_ARITY {
                if signature_bytes(depth, width) > max_signature_bytes {
                    break;
                }
                let capacity = Capacity::pow(width as u8, depth as u8);
                let improves = match &best {
                    Some((_, best_capacity)) => capacity > *best_capacity,
                    None => true,
                };
                if improves {
                    best = Some((Self::new(depth, width)?, capacity));
                }
            }
        }

        best.map(|(shape, _)| shape).ok_or(Error::BudgetTooSmall {
            budget: max_signature_bytes,
            minimum: signature_bytes(1, 1),
        })
    }

    pub fn depth(&self) -> usize {
        self.depth as usize
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub(crate) fn width_byte(&self) -> u8 {
        self.width
    }

    /// Byte size of a signature without the leading width byte.
    pub fn signature_bytes(&self) -> usize {
        signature_bytes(self.depth(), self.width())
    }

    /// Total number of leaves, `width^depth`.
    pub fn capacity(&self) -> Capacity {
        Capacity::pow(self.width, self.depth)
    }
}

/// An exact, arbitrarily large leaf count. Shapes allowed by a generous budget hold far
/// more than `u128::MAX` leaves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capacity {
    // little-endian, no trailing zero limbs
    limbs: Vec<u32>,
}

impl Capacity {
    /// `base^exp`
    pub fn pow(base: u8, exp: u8) -> Self {
        let mut limbs = vec![1u32];
        for _ in 0..exp {
            let mut carry = 0u64;
            for limb in limbs.iter_mut() {
                let product = (*limb as u64) * (base as u64) + carry;
                *limb = product as u32;
                carry = product >> 32;
            }
            if carry > 0 {
                limbs.push(carry as u32);
            }
        }
        while limbs.len() > 1 && limbs.last() == Some(&0) {
            limbs.pop();
        }
        Self { limbs }
    }

    /// The capacity as a `u128`, if it fits.
    pub fn to_u128(&self) -> Option<u128> {
        if self.limbs.len() > 4 {
            return None;
        }
        Some(
            self.limbs
                .iter()
                .rev()
                .fold(0u128, |acc, &limb| (acc << 32) | limb as u128),
        )
    }

    /// Approximate base-2 logarithm.
    pub fn log2(&self) -> f64 {
        let len = self.limbs.len();
        let top = self.limbs[len - 1] as f64;
        let (mantissa, shift) = if len >= 2 {
            (top * 4_294_967_296.0 + self.limbs[len - 2] as f64, len - 2)
        } else {
            (top, 0)
        };
        if mantissa == 0.0 {
            return f64::NEG_INFINITY;
        }
        mantissa.log2() + (shift * 32) as f64
    }
}

impl Ord for Capacity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.limbs
            .len()
            .cmp(&other.limbs.len())
            .then_with(|| self.limbs.iter().rev().cmp(other.limbs.iter().rev()))
    }
}

impl PartialOrd for Capacity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force_best(budget: usize) -> (usize, usize) {
        let mut best = (0, 0);
        let mut best_capacity = Capacity::pow(0, 1);
        for depth in 1..=TREE_MAX_ARITY {
            for width in 1..=TREE_MAX_ARITY {
                if signature_bytes(depth, width) <= budget {
                    let capacity = Capacity::pow(width as u8, depth as u8);
                    if capacity > best_capacity {
                        best = (depth, width);
                        best_capacity = capacity;
                    }
                }
            }
        }
        best
    }

    #[test]
    fn test_shape_bounds() {
        assert!(TreeShape::new(0, 4).is_err());
        assert!(TreeShape::new(4, 0).is_err());
        assert!(TreeShape::new(256, 4).is_err());
        assert!(TreeShape::new(4, 256).is_err());
        let shape = TreeShape::new(255, 255).unwrap();
        assert_eq!((shape.depth(), shape.width()), (255, 255));
    }

    #[test]
    fn test_signature_bytes() {
        let shape = TreeShape::new(2, 4).unwrap();
        assert_eq!(shape.signature_bytes(), OTS_BYTES + 2 * (4 * 32 + OTS_BYTES + 1));
    }

    #[test]
    fn test_from_budget_known_shapes() {
        let minimum = signature_bytes(1, 1);
        assert_eq!(
            TreeShape::from_budget(minimum - 1),
            Err(Error::BudgetTooSmall {
                budget: minimum - 1,
                minimum
            })
        );
        assert_eq!(TreeShape::from_budget(minimum), TreeShape::new(1, 1));
        assert_eq!(TreeShape::from_budget(4000), TreeShape::new(2, 12));
        assert_eq!(TreeShape::from_budget(8000), TreeShape::new(4, 21));
        assert_eq!(TreeShape::from_budget(16 * 1024), TreeShape::new(9, 20));
        assert_eq!(TreeShape::from_budget(64 * 1024), TreeShape::new(41, 16));
    }

    #[test]
    fn test_from_budget_is_optimal() {
        for budget in [2500, 3000, 5000, 7000, 12_000, 20_000] {
            let shape = TreeShape::from_budget(budget).unwrap();
            assert!(shape.signature_bytes() <= budget);
            assert_eq!((shape.depth(), shape.width()), brute_force_best(budget));
        }
    }

    #[test]
    fn test_capacity_arithmetic() {
        assert_eq!(Capacity::pow(4, 2).to_u128(), Some(16));
        assert_eq!(Capacity::pow(255, 0).to_u128(), Some(1));
        assert_eq!(Capacity::pow(2, 127).to_u128(), Some(1u128 << 127));
        assert_eq!(Capacity::pow(2, 128).to_u128(), None);
        assert_eq!(Capacity::pow(16, 41), Capacity::pow(2, 164));
        assert!(Capacity::pow(16, 41) > Capacity::pow(255, 20));
        assert_eq!(Capacity::pow(4, 2).cmp(&Capacity::pow(2, 4)), Ordering::Equal);
        assert!((Capacity::pow(2, 164).log2() - 164.0).abs() < 1e-9);
        assert!((Capacity::pow(12, 2).log2() - 144f64.log2()).abs() < 1e-9);
    }
}
