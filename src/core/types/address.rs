//! Absolute debuggee addresses with page arithmetic

use super::error::ReadError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Size in bytes of one cache page. Every fetch against the remote source
/// retrieves a whole region of this size, aligned to this boundary.
pub const PAGE_SIZE: usize = 4096;

const PAGE_MASK: u64 = PAGE_SIZE as u64 - 1;

/// Represents an absolute address in the debuggee's address space
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub u64);

impl Address {
    /// Creates a new address from a u64 value
    pub const fn new(value: u64) -> Self {
        Address(value)
    }

    /// Creates a null address (0x0)
    pub const fn null() -> Self {
        Address(0)
    }

    /// Checks if the address is null
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the address is aligned to the specified boundary
    pub const fn is_aligned(&self, alignment: u64) -> bool {
        alignment != 0 && self.0 % alignment == 0
    }

    /// Base address of the page containing this address
    pub const fn page_base(&self) -> Self {
        Address(self.0 & !PAGE_MASK)
    }

    /// Byte offset of this address within its page
    pub const fn page_offset(&self) -> usize {
        (self.0 & PAGE_MASK) as usize
    }

    /// Adds a signed offset to the address, wrapping on overflow
    pub const fn offset(&self, offset: i64) -> Self {
        Address(self.0.wrapping_add_signed(offset))
    }

    /// Adds an unsigned offset, or `None` if the result would overflow
    pub const fn checked_add(&self, delta: u64) -> Option<Self> {
        match self.0.checked_add(delta) {
            Some(value) => Some(Address(value)),
            None => None,
        }
    }

    /// Returns the raw u64 value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl FromStr for Address {
    type Err = ReadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        // Handle hex prefix variations
        let value = if s.starts_with("0x") || s.starts_with("0X") {
            u64::from_str_radix(&s[2..], 16)
        } else if s.starts_with('$') {
            u64::from_str_radix(&s[1..], 16)
        } else if s.chars().any(|c| c.is_ascii_alphabetic()) {
            // Assume hex if contains letters
            u64::from_str_radix(s, 16)
        } else {
            // Try decimal first, then hex
            s.parse::<u64>().or_else(|_| u64::from_str_radix(s, 16))
        };

        value
            .map(Address::new)
            .map_err(|_| ReadError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Address::new(value)
    }
}

impl From<usize> for Address {
    fn from(value: usize) -> Self {
        Address::new(value as u64)
    }
}
