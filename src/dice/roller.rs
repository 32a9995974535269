//! Sources of randomness for rolling [`Dice`] and the buffered reader that draws die faces from them.

use alloc::string::ToString;
use core::{fmt, iter::Peekable};

use super::{Dice, Error};

/// Number of random bytes fetched from a [`ByteSource`] per refill of a [`RandomBuffer`]
pub const BUFFER_LEN: usize = 256;

/// Supplies raw random bytes. Implementations for production use should be cryptographically strong.
pub trait ByteSource {
	/// Fills the entire buffer with random bytes.
	///
	/// # Errors
	/// If the underlying source is unable to supply bytes, [`Error::RandomUnavailable`] is returned.
	fn fill(&mut self, buf: &mut [u8]) -> Result<(), Error>;
}

/// Rolls dice - what else is there to say?
///
/// This is the narrow interface the rest of the crate consumes randomness through.
pub trait Roller {
	/// Reads a single random value. If `bound` is nonzero, the value is in `1..=bound`, otherwise the raw byte value
	/// (`0..=255`) is returned.
	///
	/// # Errors
	/// If the roller's randomness is unavailable, [`Error::RandomUnavailable`] is returned.
	fn read(&mut self, bound: u32) -> Result<u32, Error>;

	/// Rolls a set of dice and totals them. When `max` is set, every die shows its highest face and no randomness is
	/// consumed.
	///
	/// # Errors
	/// If randomness is unavailable, an error variant is returned.
	fn roll(&mut self, dice: &Dice, max: bool) -> Result<i64, Error> {
		if max {
			return dice.max_total();
		}

		let mut sum: i64 = 0;
		for _ in 0..dice.count {
			sum = sum
				.checked_add(i64::from(self.read(dice.sides)?))
				.ok_or_else(|| Error::Overflow(dice.to_string()))?;
		}
		Ok(sum)
	}

	/// Rolls `count` d6s (a single die if `count` is zero).
	///
	/// # Errors
	/// If randomness is unavailable, an error variant is returned.
	#[inline]
	fn d6(&mut self, count: u32, max: bool) -> Result<i64, Error> {
		self.roll(&Dice::new(count.max(1), 6), max)
	}

	/// Rolls `count` d8s (a single die if `count` is zero).
	///
	/// # Errors
	/// If randomness is unavailable, an error variant is returned.
	#[inline]
	fn d8(&mut self, count: u32, max: bool) -> Result<i64, Error> {
		self.roll(&Dice::new(count.max(1), 8), max)
	}

	/// Rolls `count` d10s (a single die if `count` is zero).
	///
	/// # Errors
	/// If randomness is unavailable, an error variant is returned.
	#[inline]
	fn d10(&mut self, count: u32, max: bool) -> Result<i64, Error> {
		self.roll(&Dice::new(count.max(1), 10), max)
	}

	/// Rolls `count` d12s (a single die if `count` is zero).
	///
	/// # Errors
	/// If randomness is unavailable, an error variant is returned.
	#[inline]
	fn d12(&mut self, count: u32, max: bool) -> Result<i64, Error> {
		self.roll(&Dice::new(count.max(1), 12), max)
	}

	/// Rolls `count` d20s (a single die if `count` is zero).
	///
	/// # Errors
	/// If randomness is unavailable, an error variant is returned.
	#[inline]
	fn d20(&mut self, count: u32, max: bool) -> Result<i64, Error> {
		self.roll(&Dice::new(count.max(1), 20), max)
	}

	/// Rolls `count` d100s (a single die if `count` is zero).
	///
	/// # Errors
	/// If randomness is unavailable, an error variant is returned.
	#[inline]
	fn d100(&mut self, count: u32, max: bool) -> Result<i64, Error> {
		self.roll(&Dice::new(count.max(1), 100), max)
	}
}

/// Buffers bytes from a [`ByteSource`] and serves bounded draws from them, one byte per draw.
///
/// The buffer starts out exhausted, so the source isn't touched until the first read. Once every buffered byte has
/// been consumed, the buffer is refilled and the cursor reset before the read proceeds.
///
/// # Examples
///
/// ## Deterministic bytes
/// ```
/// use arsenal::dice::{roller::{Bytes, RandomBuffer, Roller}, Dice};
///
/// let mut roller = RandomBuffer::new(Bytes::new([0, 5, 19]));
/// assert_eq!(roller.read(20)?, 1);
/// assert_eq!(roller.read(20)?, 6);
/// assert_eq!(roller.read(0)?, 19);
/// # Ok::<(), arsenal::dice::Error>(())
/// ```
///
/// ## Seeded fastrand bytes
/// ```
/// use arsenal::dice::{roller::{RandomBuffer, Roller}, Dice};
///
/// let mut a = RandomBuffer::with_seed(0x750c38d574400);
/// let mut b = RandomBuffer::with_seed(0x750c38d574400);
/// let dice = Dice::new(4, 6);
/// assert_eq!(a.roll(&dice, false)?, b.roll(&dice, false)?);
/// # Ok::<(), arsenal::dice::Error>(())
/// ```
#[derive(Clone)]
pub struct RandomBuffer<S> {
	/// Where fresh bytes come from
	source: S,

	/// Bytes fetched by the most recent refill
	buf: [u8; BUFFER_LEN],

	/// Index of the next unread byte in `buf`
	cursor: usize,
}

impl<S: ByteSource> RandomBuffer<S> {
	/// Creates a new, exhausted buffer over the given byte source.
	#[must_use]
	pub const fn new(source: S) -> Self {
		Self {
			source,
			buf: [0; BUFFER_LEN],
			cursor: BUFFER_LEN,
		}
	}

	/// Reads the next raw byte, refilling the buffer first if it has been used up.
	fn next_byte(&mut self) -> Result<u8, Error> {
		if self.cursor >= BUFFER_LEN {
			self.source.fill(&mut self.buf)?;
			self.cursor = 0;
			tracing::trace!(len = BUFFER_LEN, "refilled random buffer");
		}

		let byte = self.buf[self.cursor];
		self.cursor = self.cursor.saturating_add(1);
		Ok(byte)
	}

	/// Number of bytes that can be read before the next refill.
	#[must_use]
	#[inline]
	pub const fn remaining(&self) -> usize {
		BUFFER_LEN.saturating_sub(self.cursor)
	}

	/// Consumes the buffer, returning the byte source.
	#[must_use]
	#[inline]
	pub fn into_source(self) -> S {
		self.source
	}
}

#[cfg(feature = "getrandom")]
impl RandomBuffer<OsRandom> {
	/// Creates a buffer over the operating system's cryptographically strong random source.
	#[must_use]
	#[inline]
	pub const fn os() -> Self {
		Self::new(OsRandom)
	}
}

#[cfg(feature = "getrandom")]
impl Default for RandomBuffer<OsRandom> {
	#[inline]
	fn default() -> Self {
		Self::os()
	}
}

#[cfg(feature = "fastrand")]
impl RandomBuffer<fastrand::Rng> {
	/// Creates a buffer over a pre-seeded fastrand RNG, for reproducible simulations. This is *not* cryptographically
	/// strong.
	#[must_use]
	#[inline]
	pub fn with_seed(seed: u64) -> Self {
		Self::new(fastrand::Rng::with_seed(seed))
	}
}

impl<S: ByteSource> Roller for RandomBuffer<S> {
	/// Draws exactly one byte. A single byte only has 256 values, so dice with more sides than that never show a face
	/// above 256.
	fn read(&mut self, bound: u32) -> Result<u32, Error> {
		let byte = u32::from(self.next_byte()?);
		Ok(match bound {
			0 => byte,
			// Can't overflow: the remainder is at most 255
			_ => (byte % bound).saturating_add(1),
		})
	}
}

impl<S> fmt::Debug for RandomBuffer<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RandomBuffer")
			.field("cursor", &self.cursor)
			.finish_non_exhaustive()
	}
}

/// Fetches bytes from the operating system's cryptographically strong random source using [getrandom]. Requires the
/// `getrandom` feature (enabled by default).
#[cfg(feature = "getrandom")]
#[derive(Debug, Default, Clone, Copy)]
#[expect(clippy::exhaustive_structs, reason = "Unit struct with no state")]
pub struct OsRandom;

#[cfg(feature = "getrandom")]
impl ByteSource for OsRandom {
	#[inline]
	fn fill(&mut self, buf: &mut [u8]) -> Result<(), Error> {
		getrandom::fill(buf).map_err(|err| Error::RandomUnavailable(err.to_string()))
	}
}

#[cfg(feature = "fastrand")]
impl ByteSource for fastrand::Rng {
	#[inline]
	fn fill(&mut self, buf: &mut [u8]) -> Result<(), Error> {
		fastrand::Rng::fill(self, buf);
		Ok(())
	}
}

/// Supplies bytes from an iterator. Mainly useful for testing purposes.
///
/// Once the iterator has finished, further fills fail with [`Error::RandomUnavailable`].
#[derive(Debug, Clone)]
pub struct Bytes<I: Iterator<Item = u8>>(Peekable<I>);

impl<I: Iterator<Item = u8>> Bytes<I> {
	/// Creates a new byte source that uses the given iterator to provide bytes.
	#[must_use]
	#[inline]
	pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
		Self(iter.into_iter().peekable())
	}

	/// Checks whether the iterator still has bytes available.
	#[inline]
	pub fn has_bytes(&mut self) -> bool {
		self.0.peek().is_some()
	}
}

impl<I: Iterator<Item = u8>> ByteSource for Bytes<I> {
	/// Fills as much of the buffer as the iterator can supply, zeroing the rest. A buffer can't be partially
	/// consumed before its refill, so the zeroed tail is only observable by reading past the supplied bytes.
	fn fill(&mut self, buf: &mut [u8]) -> Result<(), Error> {
		if !self.has_bytes() {
			return Err(Error::RandomUnavailable("byte iterator is finished".to_string()));
		}

		for slot in buf.iter_mut() {
			*slot = self.0.next().unwrap_or(0);
		}
		Ok(())
	}
}

/// Generates draws that always have a specific value, ignoring the bound.
///
/// # Examples
/// ```
/// use arsenal::dice::{roller::{Roller, Val as ValRoller}, Dice};
///
/// let mut roller = ValRoller(3);
/// assert_eq!(roller.roll(&Dice::new(4, 6), false)?, 12);
/// assert_eq!(roller.d20(1, false)?, 3);
/// # Ok::<(), arsenal::dice::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Val(pub u32);

impl Roller for Val {
	#[inline]
	fn read(&mut self, _bound: u32) -> Result<u32, Error> {
		Ok(self.0)
	}
}
