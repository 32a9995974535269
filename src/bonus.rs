//! Named, additive damage contributions that ride along with every attack (bonuses and enchantments alike).

use alloc::{string::String, vec::Vec};
use core::fmt;

use serde::{de::IgnoredAny, Deserialize};

use crate::{
	dice::{self, Roller},
	expr::{Expr, Term},
};

/// A damage contribution of a specific type, such as `Fire: 1d6` or `Sonic: 2`
///
/// # Examples
/// ```
/// use arsenal::{dice::roller::Val as ValRoller, Bonus};
///
/// let bonus = Bonus::new("Fire", "2d6")?;
/// let value = bonus.eval(&mut ValRoller(3), false)?;
/// assert_eq!(value.kind, "Fire");
/// assert_eq!(value.value, 6);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bonus {
	/// Damage type label
	kind: String,

	/// Normalized damage expression
	term: Term,
}

impl Bonus {
	/// Creates a bonus from a damage type and expression.
	///
	/// # Errors
	/// If the type or expression is empty, [`Error::InvalidDescriptor`] is returned. If the expression is malformed,
	/// [`Error::Expression`] is returned.
	pub fn new(kind: impl Into<String>, expr: impl Into<Expr>) -> Result<Self, Error> {
		let kind = kind.into();
		let expr = expr.into();

		if kind.trim().is_empty() {
			return Err(Error::InvalidDescriptor("missing damage type"));
		}
		if expr.is_empty() {
			return Err(Error::InvalidDescriptor("missing bonus expression"));
		}

		Ok(Self {
			kind,
			term: expr.normalize()?,
		})
	}

	/// Damage type this bonus contributes to.
	#[must_use]
	#[inline]
	pub fn kind(&self) -> &str {
		&self.kind
	}

	/// Normalized damage expression of this bonus.
	#[must_use]
	#[inline]
	pub const fn term(&self) -> &Term {
		&self.term
	}

	/// Evaluates the bonus's expression. See [`Term::eval()`] for the meaning of `max`.
	///
	/// # Errors
	/// If rolling fails, an error variant is returned.
	pub fn eval<R: Roller + ?Sized>(&self, roller: &mut R, max: bool) -> Result<BonusValue<'_>, dice::Error> {
		Ok(BonusValue {
			kind: &self.kind,
			value: self.term.eval(roller, max)?,
		})
	}
}

impl TryFrom<BonusDescriptor> for Bonus {
	type Error = Error;

	/// Creates a bonus from its descriptor form. The damage type is read from `type`, falling back to `name`.
	///
	/// # Examples
	/// ```
	/// use arsenal::{bonus::BonusDescriptor, Bonus};
	///
	/// let descriptor: BonusDescriptor = serde_json::from_str(r#"{ "name": "Sonic", "bonus": "1d6" }"#)?;
	/// assert_eq!(Bonus::try_from(descriptor)?, Bonus::new("Sonic", "1d6")?);
	///
	/// let descriptor: BonusDescriptor = serde_json::from_str(r#"["Sonic", "1d6"]"#)?;
	/// assert!(Bonus::try_from(descriptor).is_err());
	/// # Ok::<(), Box<dyn std::error::Error>>(())
	/// ```
	fn try_from(descriptor: BonusDescriptor) -> Result<Self, Self::Error> {
		match descriptor {
			BonusDescriptor::Sequence(..) => Err(Error::InvalidDescriptor("expected an object, found a sequence")),
			BonusDescriptor::Fields(BonusFields { kind, name, bonus }) => {
				let kind = kind
					.filter(|kind| !kind.trim().is_empty())
					.or(name)
					.ok_or(Error::InvalidDescriptor("missing damage type"))?;
				let bonus = bonus.ok_or(Error::InvalidDescriptor("missing bonus expression"))?;
				Self::new(kind, bonus)
			}
		}
	}
}

impl fmt::Display for Bonus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.kind, self.term)
	}
}

/// Result of evaluating a [`Bonus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::exhaustive_structs)]
pub struct BonusValue<'a> {
	/// Damage type of the bonus
	pub kind: &'a str,

	/// Evaluated damage amount
	pub value: i64,
}

/// Descriptor form of a [`Bonus`], as found in configuration data
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
#[non_exhaustive]
pub enum BonusDescriptor {
	/// A sequence where an object was expected. Whether it's meant as `[type, bonus]` or a list of bonuses is
	/// ambiguous, so it is always rejected.
	Sequence(Vec<IgnoredAny>),

	/// An object with the bonus's fields
	Fields(BonusFields),
}

impl From<BonusFields> for BonusDescriptor {
	#[inline]
	fn from(value: BonusFields) -> Self {
		Self::Fields(value)
	}
}

/// Fields of an object-shaped [`BonusDescriptor`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[allow(clippy::exhaustive_structs)]
pub struct BonusFields {
	/// Damage type
	#[serde(rename = "type")]
	pub kind: Option<String>,

	/// Damage type, used when `type` is absent
	pub name: Option<String>,

	/// Damage expression
	pub bonus: Option<Expr>,
}

/// An error resulting from building a [`Bonus`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
	/// The descriptor is missing its type or expression, or isn't an object.
	///
	/// # Examples
	/// ```
	/// use arsenal::bonus::{Bonus, BonusDescriptor, BonusFields, Error};
	///
	/// let result = Bonus::try_from(BonusDescriptor::from(BonusFields::default()));
	/// assert!(matches!(result, Err(Error::InvalidDescriptor(..))));
	/// ```
	#[error("bonus descriptor is invalid: {0}")]
	InvalidDescriptor(&'static str),

	/// The bonus expression is malformed.
	#[error("invalid bonus expression: {0}")]
	Expression(#[from] dice::Error),
}
