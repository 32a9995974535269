//! All functionality for directly creating dice and rolling them.
//!
//! This is the home of the dice "primitives". For using dice as part of a larger damage expression, see
//! [`Term::Dice`].
//!
//! [`Term::Dice`]: crate::expr::Term::Dice

pub mod roller;

use alloc::string::{String, ToString};
use core::{fmt, ops::Range};

pub use self::roller::{RandomBuffer, Roller};

/// A set of one or more rollable dice with a specific number of sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::exhaustive_structs)]
pub struct Dice {
	/// Number of dice to roll
	pub count: u32,

	/// Number of sides for each die
	pub sides: u32,
}

impl Dice {
	/// Creates a new set of dice with a given count and number of sides.
	#[must_use]
	pub const fn new(count: u32, sides: u32) -> Self {
		Self { count, sides }
	}

	/// Total of the dice when every one of them shows its highest face.
	///
	/// # Errors
	/// If the total doesn't fit in an `i64`, [`Error::Overflow`] is returned.
	///
	/// # Examples
	/// ```
	/// use arsenal::Dice;
	///
	/// assert_eq!(Dice::new(3, 8).max_total()?, 24);
	/// assert_eq!(Dice::new(300, 1000).max_total()?, 300_000);
	/// assert!(Dice::new(u32::MAX, u32::MAX).max_total().is_err());
	/// # Ok::<(), arsenal::dice::Error>(())
	/// ```
	pub fn max_total(&self) -> Result<i64, Error> {
		i64::from(self.count)
			.checked_mul(i64::from(self.sides))
			.ok_or_else(|| Error::Overflow(self.to_string()))
	}
}

impl Default for Dice {
	/// Creates the default dice (1d4), the damage of an unconfigured weapon.
	#[inline]
	fn default() -> Self {
		Self::new(1, 4)
	}
}

impl fmt::Display for Dice {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}d{}", self.count, self.sides)
	}
}

/// An error resulting from a dice operation
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
	/// The expression isn't a number, an `NdM` dice term, or a collection of those.
	///
	/// # Examples
	/// ```
	/// use arsenal::{dice::{roller::Val as ValRoller, Error}, Expr};
	///
	/// let result = Expr::from("abc").eval(&mut ValRoller(1), false);
	/// assert!(matches!(result, Err(Error::InvalidExpression { .. })));
	/// ```
	#[error("invalid dice expression \"{expr}\": {reason}")]
	InvalidExpression {
		/// The offending expression text
		expr: String,

		/// What was wrong with it
		reason: String,

		/// Character range within `expr` that the problem was found at
		span: Range<usize>,
	},

	/// There was an integer overflow when totalling or multiplying damage values.
	#[error("integer overflow while evaluating {0}")]
	Overflow(String),

	/// The underlying byte source couldn't supply random bytes.
	#[error("random bytes unavailable: {0}")]
	RandomUnavailable(String),
}
