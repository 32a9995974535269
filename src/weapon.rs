//! Weapon configurations and the resolution of simulated attacks with them.

use alloc::{
	boxed::Box,
	collections::BTreeMap,
	format,
	string::{String, ToString},
	vec::Vec,
};
use core::fmt;

use serde::Deserialize;

use crate::{
	bonus::{self, Bonus, BonusDescriptor, BonusValue},
	dice::{self, Dice, Roller},
	expr::{Expr, Term},
};

/// Damage type that a weapon's base damage is recorded under
pub const PHYSICAL: &str = "Physical";

/// Name given to weapons that aren't named
pub const DEFAULT_NAME: &str = "Unnamed Weapon";

/// Lowest d20 roll that counts as a critical hit for an unconfigured weapon
pub const DEFAULT_MIN_CRIT: u8 = 19;

/// Damage multiplier applied on critical hits for an unconfigured weapon
pub const DEFAULT_CRIT_MULTIPLIER: u32 = 2;

/// Damage dealt by a single attack, keyed by damage type
pub type Damage = BTreeMap<String, i64>;

/// How an attack's rolls are made
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum AttackMode {
	/// Genuine attack: the d20 and every damage die are rolled
	#[default]
	Roll,

	/// Forced critical probe: the d20 shows 20, damage dice are rolled
	Crit,

	/// Forced max roll: the d20 shows 20 and damage dice show their highest face
	Max,
}

impl AttackMode {
	/// Whether the d20 is forced to its max rather than rolled.
	#[must_use]
	#[inline]
	pub const fn is_forced(self) -> bool {
		!matches!(self, Self::Roll)
	}

	/// Whether damage dice show their highest face.
	#[must_use]
	#[inline]
	pub const fn is_max(self) -> bool {
		matches!(self, Self::Max)
	}
}

/// A weapon: its base damage, the bonuses and enchantments that add to it, and how it crits
///
/// # Examples
/// ```
/// use arsenal::{dice::roller::Val as ValRoller, weapon::{AttackMode, PHYSICAL}, Weapon};
///
/// let mut weapon = Weapon::new("Longsword");
/// weapon.set_damage("1d8")?.crit("19-20", Some(2))?.enchant("Fire", "1d6")?.bonus("Fire", 2_i64)?;
///
/// let damage = weapon.attack(&mut ValRoller(20), AttackMode::Max)?;
/// assert_eq!(damage[PHYSICAL], 16);
/// assert_eq!(damage["Fire"], 16);
/// assert_eq!(weapon.crit_count(), 0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Weapon {
	/// Name of the weapon
	name: String,

	/// Lowest d20 roll that counts as a critical hit
	min_crit: u8,

	/// Damage multiplier on critical hits
	crit_multiplier: u32,

	/// Base (physical) damage
	damage: Term,

	/// Enchantments, added to every attack
	enchantments: Vec<Bonus>,

	/// Bonuses, added to every attack
	bonuses: Vec<Bonus>,

	/// Genuine critical hits rolled so far
	crit_count: u64,
}

impl Weapon {
	/// Creates a new weapon with the given name and default configuration (1d4 damage, crits on 19-20 for x2).
	#[must_use]
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			min_crit: DEFAULT_MIN_CRIT,
			crit_multiplier: DEFAULT_CRIT_MULTIPLIER,
			damage: Term::Dice(Dice::default()),
			enchantments: Vec::new(),
			bonuses: Vec::new(),
			crit_count: 0,
		}
	}

	/// Name of the weapon.
	#[must_use]
	#[inline]
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Lowest d20 roll that counts as a critical hit.
	#[must_use]
	#[inline]
	pub const fn min_crit(&self) -> u8 {
		self.min_crit
	}

	/// Damage multiplier on critical hits.
	#[must_use]
	#[inline]
	pub const fn crit_multiplier(&self) -> u32 {
		self.crit_multiplier
	}

	/// Base damage expression.
	#[must_use]
	#[inline]
	pub const fn damage(&self) -> &Term {
		&self.damage
	}

	/// Enchantments in the order they were added.
	#[must_use]
	#[inline]
	pub fn enchantments(&self) -> &[Bonus] {
		&self.enchantments
	}

	/// Bonuses in the order they were added.
	#[must_use]
	#[inline]
	pub fn bonuses(&self) -> &[Bonus] {
		&self.bonuses
	}

	/// Number of genuine (unforced) critical hits rolled so far.
	#[must_use]
	#[inline]
	pub const fn crit_count(&self) -> u64 {
		self.crit_count
	}

	/// Fraction of `attacks` that were genuine critical hits. Zero attacks yield a rate of zero.
	#[must_use]
	#[expect(clippy::cast_precision_loss, reason = "Attack counts are far below 2^52")]
	pub fn crit_rate(&self, attacks: u64) -> f64 {
		if attacks == 0 {
			0.0
		} else {
			self.crit_count as f64 / attacks as f64
		}
	}

	/// Replaces the base damage expression.
	///
	/// # Errors
	/// If the expression is malformed, [`Error::Damage`] is returned and the weapon is left unchanged.
	pub fn set_damage(&mut self, expr: impl Into<Expr>) -> Result<&mut Self, Error> {
		self.damage = expr.into().normalize()?;
		Ok(self)
	}

	/// Sets the critical range and, if given, the critical multiplier. Omitting the multiplier keeps the current one.
	///
	/// # Errors
	/// If no minimum in `2..=20` can be extracted from the range, [`Error::InvalidCritRange`] is returned. If the
	/// multiplier is zero, [`Error::InvalidCritMultiplier`] is returned. Either way, the weapon is left unchanged.
	///
	/// # Examples
	/// ```
	/// use arsenal::{weapon::CritRange, Weapon};
	///
	/// let mut weapon = Weapon::default();
	/// assert_eq!(weapon.crit("18-20", None)?.min_crit(), 18);
	/// assert_eq!(weapon.crit(CritRange::List(vec![CritRange::Num(17)]), Some(3))?.min_crit(), 17);
	/// assert_eq!(weapon.crit_multiplier(), 3);
	/// assert!(weapon.crit(CritRange::List(vec![]), None).is_err());
	/// # Ok::<(), arsenal::weapon::Error>(())
	/// ```
	pub fn crit(&mut self, range: impl Into<CritRange>, multiplier: Option<u32>) -> Result<&mut Self, Error> {
		let min_crit = range.into().min_crit()?;
		if let Some(multiplier) = multiplier {
			if multiplier == 0 {
				return Err(Error::InvalidCritMultiplier(multiplier));
			}
			self.crit_multiplier = multiplier;
		}
		self.min_crit = min_crit;
		Ok(self)
	}

	/// Adds an enchantment of the given damage type.
	///
	/// # Errors
	/// If the type or expression is invalid, [`Error::Bonus`] is returned.
	pub fn enchant(&mut self, kind: impl Into<String>, expr: impl Into<Expr>) -> Result<&mut Self, Error> {
		Ok(self.push_enchantment(Bonus::new(kind, expr)?))
	}

	/// Adds a bonus of the given damage type.
	///
	/// # Errors
	/// If the type or expression is invalid, [`Error::Bonus`] is returned.
	pub fn bonus(&mut self, kind: impl Into<String>, expr: impl Into<Expr>) -> Result<&mut Self, Error> {
		Ok(self.push_bonus(Bonus::new(kind, expr)?))
	}

	/// Adds an already-built enchantment.
	pub fn push_enchantment(&mut self, enchantment: Bonus) -> &mut Self {
		self.enchantments.push(enchantment);
		self
	}

	/// Adds an already-built bonus.
	pub fn push_bonus(&mut self, bonus: Bonus) -> &mut Self {
		self.bonuses.push(bonus);
		self
	}

	/// Simulates a single attack, returning the damage dealt per damage type.
	///
	/// A d20 is rolled (or forced to 20 for [`AttackMode::Crit`] and [`AttackMode::Max`]), and if it lands within the
	/// critical range, the base damage and every enchantment and bonus are multiplied by the critical multiplier.
	/// Base damage is recorded under [`PHYSICAL`]; enchantments and bonuses are summed under their own types.
	///
	/// Only genuine critical hits from [`AttackMode::Roll`] count towards [`Self::crit_count()`]. If an error occurs,
	/// no damage is returned and the count is untouched.
	///
	/// # Errors
	/// If rolling fails or damage overflows, an error variant is returned.
	pub fn attack<R: Roller + ?Sized>(&mut self, roller: &mut R, mode: AttackMode) -> Result<Damage, dice::Error> {
		let attack_roll = roller.d20(1, mode.is_forced())?;
		let multiplier = if attack_roll >= i64::from(self.min_crit) {
			i64::from(self.crit_multiplier)
		} else {
			1
		};

		let max = mode.is_max();
		let mut damage = Damage::new();
		let physical = self.damage.eval(roller, max)?;
		add_damage(&mut damage, PHYSICAL, physical, multiplier)?;

		for bonus in self.enchantments.iter().chain(&self.bonuses) {
			let BonusValue { kind, value } = bonus.eval(roller, max)?;
			add_damage(&mut damage, kind, value, multiplier)?;
		}

		if multiplier > 1 && !mode.is_forced() {
			self.crit_count = self.crit_count.saturating_add(1);
		}

		Ok(damage)
	}
}

/// Multiplies a damage value and adds it to the running total for its type.
fn add_damage(damage: &mut Damage, kind: &str, value: i64, multiplier: i64) -> Result<(), dice::Error> {
	let overflow = || dice::Error::Overflow(format!("{kind} damage"));
	let value = value.checked_mul(multiplier).ok_or_else(overflow)?;
	let total = damage.entry(kind.to_string()).or_insert(0);
	*total = total.checked_add(value).ok_or_else(overflow)?;
	Ok(())
}

impl Default for Weapon {
	#[inline]
	fn default() -> Self {
		Self::new(DEFAULT_NAME)
	}
}

impl fmt::Display for Weapon {
	/// Formats the value using the given formatter. [Read more][core::fmt::Debug::fmt()]
	///
	/// # Examples
	/// ```
	/// use arsenal::Weapon;
	///
	/// let mut weapon = Weapon::new("Rapier");
	/// weapon.set_damage("1d6")?.crit(18_u8, None)?.enchant("Sonic", "1d6")?;
	/// assert_eq!(weapon.to_string(), "Rapier: 1d6 (18-20/x2), enchantments [Sonic: 1d6], bonuses []");
	/// # Ok::<(), arsenal::weapon::Error>(())
	/// ```
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}: {} ({}-20/x{}), enchantments [",
			self.name, self.damage, self.min_crit, self.crit_multiplier
		)?;
		write_list(f, &self.enchantments)?;
		f.write_str("], bonuses [")?;
		write_list(f, &self.bonuses)?;
		f.write_str("]")
	}
}

/// Writes bonuses separated by commas.
fn write_list(f: &mut fmt::Formatter<'_>, bonuses: &[Bonus]) -> fmt::Result {
	for (idx, bonus) in bonuses.iter().enumerate() {
		if idx > 0 {
			f.write_str(", ")?;
		}
		write!(f, "{bonus}")?;
	}
	Ok(())
}

/// A critical range in any of the shapes it can be written in: `18`, `"18"`, `"18-20"`, `[18]`, `{ "min": 18 }` or
/// `{ "minimum": "18" }`. Only the lower bound matters, since the range always extends to 20.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
#[non_exhaustive]
pub enum CritRange {
	/// Lower bound as a number
	Num(i64),

	/// Lower bound or hyphenated range as text
	Text(String),

	/// Sequence whose first element is the lower bound
	List(Vec<Self>),

	/// Object holding the lower bound
	Bounds {
		/// Lower bound
		min: Option<Box<Self>>,

		/// Lower bound, used when `min` is absent
		minimum: Option<Box<Self>>,
	},
}

impl CritRange {
	/// Extracts the lowest d20 roll that counts as a critical hit.
	///
	/// # Errors
	/// If there's no usable lower bound in `2..=20`, [`Error::InvalidCritRange`] is returned.
	pub fn min_crit(&self) -> Result<u8, Error> {
		let min = match self {
			Self::Num(min) => *min,
			Self::Text(text) => parse_lower_bound(text).ok_or_else(|| Error::InvalidCritRange(text.clone()))?,
			Self::List(items) => {
				return items
					.first()
					.ok_or_else(|| Error::InvalidCritRange("empty sequence".to_string()))?
					.min_crit();
			}
			Self::Bounds { min, minimum } => {
				return min
					.as_deref()
					.or(minimum.as_deref())
					.ok_or_else(|| Error::InvalidCritRange("no min or minimum".to_string()))?
					.min_crit();
			}
		};

		u8::try_from(min)
			.ok()
			.filter(|min| (2..=20).contains(min))
			.ok_or_else(|| Error::InvalidCritRange(format!("{min} is outside of 2-20")))
	}
}

/// Parses either a plain number or the lower half of a hyphenated range.
fn parse_lower_bound(text: &str) -> Option<i64> {
	let text = text.trim();
	text.parse().ok().or_else(|| {
		text.split_once('-')
			.and_then(|(lower, _upper)| lower.trim().parse().ok())
	})
}

impl From<i64> for CritRange {
	#[inline]
	fn from(value: i64) -> Self {
		Self::Num(value)
	}
}

impl From<u8> for CritRange {
	#[inline]
	fn from(value: u8) -> Self {
		Self::Num(value.into())
	}
}

impl From<&str> for CritRange {
	#[inline]
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<String> for CritRange {
	#[inline]
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<Vec<Self>> for CritRange {
	#[inline]
	fn from(value: Vec<Self>) -> Self {
		Self::List(value)
	}
}

/// Descriptor form of a [`Weapon`], as found in configuration data
///
/// # Examples
/// ```
/// use arsenal::{weapon::WeaponDescriptor, Weapon};
///
/// let descriptor: WeaponDescriptor = serde_json::from_str(
/// 	r#"{
/// 		"name": "Flaming Scimitar",
/// 		"damage": "1d6",
/// 		"critRange": "18-20",
/// 		"enchant": [{ "type": "Fire", "bonus": "1d6" }],
/// 		"bonus": [{ "name": "Strength", "bonus": 3 }]
/// 	}"#,
/// )?;
/// let weapon = Weapon::try_from(descriptor)?;
/// assert_eq!(weapon.min_crit(), 18);
/// assert_eq!(weapon.crit_multiplier(), 2);
/// assert_eq!(weapon.enchantments().len(), 1);
/// assert_eq!(weapon.bonuses()[0].kind(), "Strength");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(clippy::exhaustive_structs)]
pub struct WeaponDescriptor {
	/// Name of the weapon
	pub name: Option<String>,

	/// Critical range
	pub crit_range: Option<CritRange>,

	/// Critical multiplier
	pub crit_multiplier: Option<u32>,

	/// Base damage expression
	pub damage: Option<Expr>,

	/// Enchantments
	pub enchant: Vec<BonusDescriptor>,

	/// Bonuses
	pub bonus: Vec<BonusDescriptor>,
}

impl TryFrom<WeaponDescriptor> for Weapon {
	type Error = Error;

	fn try_from(descriptor: WeaponDescriptor) -> Result<Self, Self::Error> {
		let mut weapon = Self::new(
			descriptor
				.name
				.filter(|name| !name.is_empty())
				.unwrap_or_else(|| DEFAULT_NAME.to_string()),
		);

		if let Some(damage) = descriptor.damage {
			weapon.set_damage(damage)?;
		}

		let range = descriptor
			.crit_range
			.unwrap_or_else(|| CritRange::from(DEFAULT_MIN_CRIT));
		weapon.crit(range, descriptor.crit_multiplier)?;

		for enchantment in descriptor.enchant {
			weapon.push_enchantment(Bonus::try_from(enchantment)?);
		}
		for bonus in descriptor.bonus {
			weapon.push_bonus(Bonus::try_from(bonus)?);
		}

		Ok(weapon)
	}
}

/// An error resulting from configuring a [`Weapon`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
	/// No usable minimum could be extracted from a critical range.
	#[error("invalid crit range: {0}")]
	InvalidCritRange(String),

	/// The critical multiplier is zero.
	#[error("crit multiplier must be at least 1, got {0}")]
	InvalidCritMultiplier(u32),

	/// An enchantment or bonus is invalid.
	#[error(transparent)]
	Bonus(#[from] bonus::Error),

	/// The base damage expression is malformed.
	#[error("invalid weapon damage: {0}")]
	Damage(#[from] dice::Error),
}
