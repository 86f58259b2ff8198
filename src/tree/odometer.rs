use crate::{Error, Result};

/// Outcome of moving the [`Odometer`] to the next leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// The digit at `level` was incremented and every deeper digit wrapped to zero.
    /// Keys below `level` no longer belong to the current path.
    Moved { level: usize },
    /// The top digit carried out: every leaf has been used.
    Exhausted,
}

/// Mixed-radix position of the next unused leaf: one base-`width` digit per level, most
/// significant digit at level 0.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Odometer {
    digits: Vec<u8>,
    width: u8,
    exhausted: bool,
}

impl Odometer {
    pub fn new(depth: usize, width: u8) -> Self {
        Self {
            digits: vec![0; depth],
            width,
            exhausted: false,
        }
    }

    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    pub fn digit(&self, level: usize) -> u8 {
        self.digits[level]
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Moves to the next leaf, carrying from the deepest digit upwards.
    pub fn advance(&mut self) -> Advance {
        if self.exhausted {
            return Advance::Exhausted;
        }
        for level in (0..self.digits.len()).rev() {
            if self.digits[level] + 1 < self.width {
                self.digits[level] += 1;
                return Advance::Moved { level };
            }
            self.digits[level] = 0;
        }
        self.exhausted = true;
        Advance::Exhausted
    }

    /// Checks that this odometer addresses a tree of `depth` levels of `width` keys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidShape`] on any mismatch.
    pub(crate) fn check(&self, depth: usize, width: u8) -> Result<()> {
        if self.digits.len() != depth || self.width != width {
            return Err(Error::InvalidShape(format!(
                "odometer of {} digits in base {} does not fit a {depth} x {width} tree",
                self.digits.len(),
                self.width
            )));
        }
        if let Some(level) = self.digits.iter().position(|&digit| digit >= width) {
            return Err(Error::InvalidShape(format!(
                "digit {} at level {level} exceeds width {width}",
                self.digits[level]
            )));
        }
        Ok(())
    }

    /// Number of leaves already consumed, if it fits in a `u128`.
    pub fn position(&self) -> Option<u128> {
        self.digits.iter().try_fold(0u128, |acc, &digit| {
            acc.checked_mul(self.width as u128)?
                .checked_add(digit as u128)
        })
    }
}
