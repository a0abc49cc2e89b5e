//! A fixed-capacity bitboard over a rectangular grid.
//!
//! The type is `no_std` friendly and avoids heap allocations. Boards are
//! represented as a `width×height` grid packed row-major into an unsigned
//! integer `T`, so a 10×10 board fits in a `u128`. Every ship footprint and
//! constraint set in the sampler is one of these masks.

use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};
use core::{any, fmt, mem};
use num_traits::{PrimInt, Unsigned, Zero};

/// Errors returned by bitboard operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitBoardError {
    /// Requested board area exceeds the capacity of `T::BITS`.
    SizeTooLarge { cells: usize, capacity: usize },
    /// Row or column index is out of bounds.
    IndexOutOfBounds { row: usize, col: usize },
}

impl fmt::Display for BitBoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitBoardError::SizeTooLarge { cells, capacity } => {
                write!(f, "SizeTooLarge: {} cells exceed T::BITS={}", cells, capacity)
            }
            BitBoardError::IndexOutOfBounds { row, col } => {
                write!(f, "IndexOutOfBounds: row={}, col={}", row, col)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BitBoardError {}

/// A `width×height` bitboard stored in the unsigned integer `T`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitBoard<T>
where
    T: PrimInt + Unsigned + Zero,
{
    bits: T,
    width: u8,
    height: u8,
}

/// Mask type used for every board in the sampler.
pub type Mask = BitBoard<u128>;

impl<T> BitBoard<T>
where
    T: PrimInt + Unsigned + Zero,
{
    /// Number of cells the backing integer can hold.
    #[inline]
    pub fn capacity() -> usize {
        mem::size_of::<T>() * 8
    }

    #[inline]
    fn mask(&self) -> T {
        let cells = self.cells();
        if cells == Self::capacity() {
            !T::zero()
        } else {
            (T::one() << cells) - T::one()
        }
    }

    /// Create a new empty bitboard without size check.
    ///
    /// Callers must have validated the dimensions, see [`BitBoard::try_new`].
    #[inline]
    pub fn new(width: usize, height: usize) -> Self {
        debug_assert!(width * height <= Self::capacity());
        BitBoard {
            bits: T::zero(),
            width: width as u8,
            height: height as u8,
        }
    }

    /// Fallible constructor: returns `Err(SizeTooLarge)` if the area exceeds `T::BITS`.
    pub fn try_new(width: usize, height: usize) -> Result<Self, BitBoardError> {
        let capacity = Self::capacity();
        let cells = width.saturating_mul(height);
        if cells > capacity || width > u8::MAX as usize || height > u8::MAX as usize {
            Err(BitBoardError::SizeTooLarge { cells, capacity })
        } else {
            Ok(Self::new(width, height))
        }
    }

    /// Board width in cells.
    #[inline]
    pub fn width(&self) -> usize {
        self.width as usize
    }

    /// Board height in cells.
    #[inline]
    pub fn height(&self) -> usize {
        self.height as usize
    }

    /// Number of cells on the board (`width * height`).
    #[inline]
    pub fn cells(&self) -> usize {
        self.width() * self.height()
    }

    /// Returns the number of set bits (occupied cells).
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Returns true if no bits are set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_zero()
    }

    /// Gets the bit at (row, col).
    pub fn get(&self, row: usize, col: usize) -> Result<bool, BitBoardError> {
        let idx = self.index(row, col)?;
        Ok(((self.bits >> idx) & T::one()) != T::zero())
    }

    /// Sets the bit at (row, col) to 1.
    pub fn set(&mut self, row: usize, col: usize) -> Result<(), BitBoardError> {
        let idx = self.index(row, col)?;
        self.bits = self.bits | (T::one() << idx);
        Ok(())
    }

    /// Infallible read: out-of-bounds cells are reported as unset.
    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.get(row, col).unwrap_or(false)
    }

    /// Infallible write: returns `false` and leaves the board untouched when
    /// (row, col) is out of bounds.
    #[inline]
    pub fn insert(&mut self, row: usize, col: usize) -> bool {
        self.set(row, col).is_ok()
    }

    /// Clears all bits to `0`.
    #[inline]
    pub fn clear_all(&mut self) {
        self.bits = T::zero();
    }

    /// True when every set bit of `self` is also set in `other`.
    #[inline]
    pub fn is_subset(&self, other: &Self) -> bool {
        (self.bits & !other.bits).is_zero()
    }

    /// True when the two boards share at least one set bit.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.bits & other.bits).is_zero()
    }

    /// Grow the set by one cell in all eight directions, clipped to the board.
    pub fn dilate(&self) -> Self {
        let width = self.width();
        if self.cells() == 0 {
            return *self;
        }
        let (left, right) = self.edge_columns();
        let horizontal = self.bits
            | ((self.bits << 1) & !left)
            | ((self.bits >> 1) & !right);
        if self.height() == 1 {
            return self.with_bits(horizontal);
        }
        let grown = horizontal | (horizontal << width) | (horizontal >> width);
        self.with_bits(grown)
    }

    /// Masks of the first and last columns.
    fn edge_columns(&self) -> (T, T) {
        let width = self.width();
        let mut left = T::zero();
        let mut right = T::zero();
        for r in 0..self.height() {
            left = left | (T::one() << (r * width));
            right = right | (T::one() << (r * width + width - 1));
        }
        (left, right)
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> Result<usize, BitBoardError> {
        if row >= self.height() || col >= self.width() {
            Err(BitBoardError::IndexOutOfBounds { row, col })
        } else {
            Ok(row * self.width() + col)
        }
    }

    #[inline]
    fn with_bits(&self, bits: T) -> Self {
        let mut board = *self;
        board.bits = bits & self.mask();
        board
    }

    /// Creates a bitboard from an iterator over `(row, col)` positions.
    pub fn from_iter<I>(width: usize, height: usize, iter: I) -> Result<Self, BitBoardError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut board = Self::try_new(width, height)?;
        for (r, c) in iter {
            board.set(r, c)?;
        }
        Ok(board)
    }

    /// Iterator over the set bits of the board in row-major order.
    #[inline]
    pub fn iter_set_bits(&self) -> SetBits<T> {
        SetBits {
            bits: self.bits,
            width: self.width(),
        }
    }
}

impl<T> fmt::Debug for BitBoard<T>
where
    T: PrimInt + Unsigned + Zero,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "BitBoard<{}, {}x{}>:",
            any::type_name::<T>(),
            self.width,
            self.height
        )?;
        fmt::Display::fmt(self, f)?;
        writeln!(f)
    }
}

impl<T> fmt::Display for BitBoard<T>
where
    T: PrimInt + Unsigned + Zero,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.height() {
            for c in 0..self.width() {
                let bit = if self.contains(r, c) { '■' } else { '□' };
                write!(f, "{} ", bit)?;
            }
            if r + 1 < self.height() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Iterator over the set bits of a bitboard.
#[derive(Clone, Copy)]
pub struct SetBits<T>
where
    T: PrimInt + Unsigned + Zero,
{
    bits: T,
    width: usize,
}

impl<T> Iterator for SetBits<T>
where
    T: PrimInt + Unsigned + Zero,
{
    type Item = (usize, usize);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.bits.is_zero() {
            return None;
        }
        let idx = self.bits.trailing_zeros() as usize;
        self.bits = self.bits & (self.bits - T::one());
        Some((idx / self.width, idx % self.width))
    }
}

/// Bitwise AND for combining two bitboards.
impl<T> BitAnd for BitBoard<T>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        debug_assert_eq!((self.width, self.height), (rhs.width, rhs.height));
        self.with_bits(self.bits & rhs.bits)
    }
}

/// Bitwise OR for combining two bitboards.
impl<T> BitOr for BitBoard<T>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        debug_assert_eq!((self.width, self.height), (rhs.width, rhs.height));
        self.with_bits(self.bits | rhs.bits)
    }
}

/// Bitwise NOT for inverting a bitboard (within board bounds).
impl<T> Not for BitBoard<T>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    #[inline]
    fn not(self) -> Self {
        self.with_bits(!self.bits)
    }
}

impl<T> BitAndAssign for BitBoard<T>
where
    T: PrimInt + Unsigned + Zero,
{
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.bits = self.bits & rhs.bits;
    }
}

impl<T> BitOrAssign for BitBoard<T>
where
    T: PrimInt + Unsigned + Zero,
{
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.bits = self.bits | rhs.bits;
    }
}
