//! Parser generators for the text form of dice expressions: plain integers ("5", "-2") and dice terms ("d20", "2d6").
//!
//! Most users won't need these directly, since [`Term`] implements [`FromStr`](core::str::FromStr) using them.

use alloc::{
	format,
	string::{String, ToString},
	vec::Vec,
};
use core::str::FromStr;

use chumsky::prelude::*;

use crate::{
	dice::{Dice, Error},
	expr::Term,
};

/// Generates a parser that specifically handles dice terms like "d20", "2d6", "10d8", etc.
///
/// Once a dice term has been matched, a count or number of sides that's zero or out of range is reported as an error
/// against the term rather than failing the parser, so the reason isn't lost to other alternatives.
pub fn dice_part<'src>() -> impl Parser<'src, &'src str, Dice, extra::Err<Rich<'src, char>>> + Clone {
	text::int(10)
		.or_not()
		.then_ignore(just('d'))
		.then(text::int(10))
		.validate(|(count, sides): (Option<&'src str>, &'src str), e, emitter| {
			let span = e.span();
			let count = dice_number(count.unwrap_or("1"), "count");
			let sides = dice_number(sides, "sides");

			match (count, sides) {
				(Ok(count), Ok(sides)) => Dice::new(count, sides),
				(count, sides) => {
					for reason in [count.err(), sides.err()].into_iter().flatten() {
						emitter.emit(Rich::custom(span, reason));
					}
					Dice::default()
				}
			}
		})
}

/// Parses a dice count or number of sides, which must be at least 1.
fn dice_number(digits: &str, what: &str) -> Result<u32, String> {
	match digits.parse::<u32>() {
		Ok(0) => Err(format!("Dice {what} must be at least 1")),
		Ok(val) => Ok(val),
		Err(err) => Err(format!("Dice {what}: {err}")),
	}
}

/// Generates a parser that handles optionally-negative integers like "5" or "-2".
pub fn num_part<'src>() -> impl Parser<'src, &'src str, i64, extra::Err<Rich<'src, char>>> + Clone {
	just('-')
		.or_not()
		.then(text::int(10))
		.try_map(|(neg, digits): (Option<char>, &'src str), span| {
			let val: i64 = digits
				.parse()
				.map_err(|err| Rich::custom(span, format!("Number: {err}")))?;
			match neg {
				Some(..) => val
					.checked_neg()
					.ok_or_else(|| Rich::custom(span, "Number is out of range")),
				None => Ok(val),
			}
		})
}

/// Generates a parser that handles a single dice term or number, surrounded by optional whitespace.
pub fn term_part<'src>() -> impl Parser<'src, &'src str, Term, extra::Err<Rich<'src, char>>> + Clone {
	choice((dice_part().map(Term::Dice), num_part().map(Term::Num))).padded()
}

/// Generates a parser that handles a single dice term or number and expects end of input.
pub fn term<'src>() -> impl Parser<'src, &'src str, Term, extra::Err<Rich<'src, char>>> + Clone {
	term_part().then_ignore(end())
}

impl FromStr for Term {
	type Err = Error;

	/// Parses a dice term or number. Input is case-insensitive.
	///
	/// # Examples
	/// ```
	/// use arsenal::{expr::Term, Dice};
	///
	/// assert_eq!("2D6".parse::<Term>()?, Term::Dice(Dice::new(2, 6)));
	/// assert_eq!("d20".parse::<Term>()?, Term::Dice(Dice::new(1, 20)));
	/// assert_eq!(" -2 ".parse::<Term>()?, Term::Num(-2));
	/// assert!("2d6+1".parse::<Term>().is_err());
	/// # Ok::<(), arsenal::dice::Error>(())
	/// ```
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		// ASCII lowercasing keeps byte offsets valid for the original text
		let lc = s.to_ascii_lowercase();
		let result = term().parse(lc.as_str()).into_result().map_err(|errs| {
			let span = errs
				.first()
				.map_or(0..lc.len(), |err| err.span().start..err.span().end);
			Error::InvalidExpression {
				expr: s.to_string(),
				reason: errs.iter().map(ToString::to_string).collect::<Vec<String>>().join("; "),
				span,
			}
		});
		result
	}
}
