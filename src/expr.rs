//! Dice expressions as they're written in weapon descriptors ([`Expr`]) and their normalized, evaluable form
//! ([`Term`]).

use alloc::{
	collections::BTreeMap,
	string::{String, ToString},
	vec::Vec,
};
use core::fmt;

use serde::Deserialize;

use crate::dice::{Dice, Error, Roller};

/// A damage expression as supplied by calling code or configuration: a flat number, dice text like `"2d6"`, or a
/// collection of further expressions that are summed together.
///
/// Expressions are normalized into a [`Term`] before evaluation, which is where malformed text gets rejected.
///
/// # Examples
/// ```
/// use arsenal::{dice::roller::Val as ValRoller, Expr};
///
/// let expr = Expr::List(vec![Expr::from("2d6"), Expr::from(3_i64)]);
/// assert_eq!(expr.eval(&mut ValRoller(4), false)?, 11);
/// # Ok::<(), arsenal::dice::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
#[non_exhaustive]
pub enum Expr {
	/// Standalone integer
	Num(i64),

	/// Dice term or number in text form
	Text(String),

	/// Ordered collection of expressions to sum
	List(Vec<Self>),

	/// Labelled collection of expressions to sum (the labels are ignored)
	Map(BTreeMap<String, Self>),
}

impl Expr {
	/// Converts the expression into its canonical form, parsing any text along the way.
	///
	/// # Errors
	/// If any text in the expression isn't a number or dice term, [`Error::InvalidExpression`] is returned.
	pub fn normalize(&self) -> Result<Term, Error> {
		Ok(match self {
			Self::Num(x) => Term::Num(*x),
			Self::Text(text) => text.parse::<Term>()?,
			Self::List(items) => Term::Sum(items.iter().map(Self::normalize).collect::<Result<_, _>>()?),
			Self::Map(items) => Term::Sum(items.values().map(Self::normalize).collect::<Result<_, _>>()?),
		})
	}

	/// Normalizes and evaluates the expression in one go. See [`Term::eval()`] for details on evaluation.
	///
	/// # Errors
	/// If the expression is malformed or rolling fails, an error variant is returned.
	#[inline]
	pub fn eval<R: Roller + ?Sized>(&self, roller: &mut R, max: bool) -> Result<i64, Error> {
		self.normalize()?.eval(roller, max)
	}

	/// Checks whether the expression has nothing in it (blank text or an empty collection).
	#[must_use]
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Num(..) => false,
			Self::Text(text) => text.trim().is_empty(),
			Self::List(items) => items.is_empty(),
			Self::Map(items) => items.is_empty(),
		}
	}
}

impl From<i64> for Expr {
	#[inline]
	fn from(value: i64) -> Self {
		Self::Num(value)
	}
}

impl From<&str> for Expr {
	#[inline]
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<String> for Expr {
	#[inline]
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<Dice> for Expr {
	#[inline]
	fn from(value: Dice) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<Vec<Self>> for Expr {
	#[inline]
	fn from(value: Vec<Self>) -> Self {
		Self::List(value)
	}
}

impl From<BTreeMap<String, Self>> for Expr {
	#[inline]
	fn from(value: BTreeMap<String, Self>) -> Self {
		Self::Map(value)
	}
}

/// Canonical form of a damage expression, ready to be evaluated
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Term {
	/// Standalone integer
	Num(i64),

	/// Dice literal
	Dice(Dice),

	/// Sum of several terms
	Sum(Vec<Self>),
}

impl Term {
	/// Evaluates the term. Numbers are returned as-is and dice are rolled with the given roller. When `max` is set,
	/// dice show their highest face instead of being rolled.
	///
	/// Members of a [`Term::Sum`] are always rolled normally, even when `max` is set for the sum itself.
	///
	/// # Errors
	/// If rolling fails or the total overflows, an error variant is returned.
	///
	/// # Examples
	/// ```
	/// use arsenal::{dice::roller::Val as ValRoller, expr::Term, Dice};
	///
	/// let dice = Term::Dice(Dice::new(2, 6));
	/// assert_eq!(dice.eval(&mut ValRoller(1), true)?, 12);
	///
	/// let sum = Term::Sum(vec![dice, Term::Num(2)]);
	/// assert_eq!(sum.eval(&mut ValRoller(1), true)?, 4);
	/// # Ok::<(), arsenal::dice::Error>(())
	/// ```
	pub fn eval<R: Roller + ?Sized>(&self, roller: &mut R, max: bool) -> Result<i64, Error> {
		match self {
			Self::Num(x) => Ok(*x),
			Self::Dice(dice) => roller.roll(dice, max),
			Self::Sum(terms) => terms.iter().try_fold(0_i64, |sum, term| {
				sum.checked_add(term.eval(roller, false)?)
					.ok_or_else(|| Error::Overflow(self.to_string()))
			}),
		}
	}

	/// Checks whether the term is deterministic (will always yield the same value with every evaluation).
	/// A [`Self::Num`] will always return `true`, a [`Self::Dice`] will always return `false` unless the dice only
	/// have one side, and a [`Self::Sum`] forwards the check to its members.
	#[must_use]
	pub fn is_deterministic(&self) -> bool {
		match self {
			Self::Num(..) => true,
			Self::Dice(dice) => dice.sides == 1,
			Self::Sum(terms) => terms.iter().all(Self::is_deterministic),
		}
	}
}

impl From<Dice> for Term {
	#[inline]
	fn from(value: Dice) -> Self {
		Self::Dice(value)
	}
}

impl From<i64> for Term {
	#[inline]
	fn from(value: i64) -> Self {
		Self::Num(value)
	}
}

impl fmt::Display for Term {
	/// Formats the value using the given formatter. [Read more][core::fmt::Debug::fmt()]
	///
	/// Sums are wrapped in parentheses with their members separated by ` + `.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Num(x) => write!(f, "{x}"),
			Self::Dice(dice) => write!(f, "{dice}"),
			Self::Sum(terms) => {
				f.write_str("(")?;
				for (idx, term) in terms.iter().enumerate() {
					if idx > 0 {
						f.write_str(" + ")?;
					}
					write!(f, "{term}")?;
				}
				f.write_str(")")
			}
		}
	}
}
