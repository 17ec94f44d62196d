//! # Secret Scanner
//!
//! Bit-level matching of secrets against a register snapshot.
//!
//! Every scan is a pure function of the snapshot and the secret set: nothing
//! is mutated, nothing can fail, and scanning the same snapshot twice yields
//! the same matches.
//!
//! ## Alignment
//!
//! A secret's bits are numbered from 0, starting at the most significant bit
//! of its first byte. Register bits are numbered from 0 at the least
//! significant bit of the value. [`MatchMode`] decides which register bit a
//! given secret bit is compared against.

use std::fmt;
use std::str::FromStr;

use crate::types::{RegisterId, RegisterSnapshot, Secret, SecretSet};

/// How secret bits line up with register bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode
{
    /// Secret bit `i` is compared with register bit `i + 1`
    ///
    /// This is the alignment earlier versions of the tool used, kept so
    /// results stay comparable. A secret bit whose shifted position falls
    /// past the register's top bit is not compared.
    #[default]
    Shifted,
    /// Secret bit `i` is compared with register bit `i`
    Exact,
}

impl MatchMode
{
    /// Check one secret against one register value
    ///
    /// Returns `false` when the secret is empty or has more bits than the
    /// register is wide; otherwise `true` iff every compared bit agrees.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use regscan_core::scanner::MatchMode;
    ///
    /// // "A" = 0b0100_0001, shifted up by one bit
    /// let bits = [false, true, false, false, false, false, false, true];
    /// assert!(MatchMode::Shifted.matches(&bits, 0x104, 64));
    /// assert!(!MatchMode::Exact.matches(&bits, 0x104, 64));
    /// assert!(MatchMode::Exact.matches(&bits, 0x82, 64));
    /// ```
    #[must_use]
    pub fn matches(self, bits: &[bool], value: u64, width: u32) -> bool
    {
        let width = width.min(u64::BITS) as usize;
        if bits.is_empty() || bits.len() > width {
            return false;
        }

        let offset = match self {
            MatchMode::Shifted => 1,
            MatchMode::Exact => 0,
        };

        bits.iter()
            .enumerate()
            .take(width - offset)
            .all(|(i, &bit)| ((value >> (i + offset)) & 1 == 1) == bit)
    }
}

impl FromStr for MatchMode
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "shifted" | "legacy" => Ok(MatchMode::Shifted),
            "exact" => Ok(MatchMode::Exact),
            _ => Err(format!("Unknown match mode: {s}. Use 'shifted' or 'exact'")),
        }
    }
}

impl fmt::Display for MatchMode
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            MatchMode::Shifted => write!(f, "shifted"),
            MatchMode::Exact => write!(f, "exact"),
        }
    }
}

/// One secret found in one register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretMatch<'a>
{
    /// The secret that matched
    pub secret: &'a Secret,
    /// The register it matched in
    pub register: RegisterId,
}

/// Scans register snapshots for a fixed set of secrets
///
/// ## Example
///
/// ```rust
/// use regscan_core::scanner::{MatchMode, SecretScanner};
/// use regscan_core::types::{RegisterId, RegisterSnapshot, SecretSet};
///
/// let secrets = SecretSet::from_pairs([("flag", "A")])?;
/// let scanner = SecretScanner::new(secrets, MatchMode::Shifted);
///
/// // Every other register is zero, and "A" does not match zero.
/// let regs = RegisterSnapshot::new().with(RegisterId::Pc, 0x104);
/// let found = scanner.scan(&regs);
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].secret.name(), "flag");
/// assert_eq!(found[0].register, RegisterId::Pc);
/// # Ok::<(), regscan_core::error::RegscanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SecretScanner
{
    secrets: SecretSet,
    mode: MatchMode,
}

impl SecretScanner
{
    /// Create a scanner over a fixed secret set.
    #[must_use]
    pub fn new(secrets: SecretSet, mode: MatchMode) -> Self
    {
        Self { secrets, mode }
    }

    /// The secrets being searched for.
    #[must_use]
    pub fn secrets(&self) -> &SecretSet
    {
        &self.secrets
    }

    /// The bit alignment in use.
    #[must_use]
    pub fn mode(&self) -> MatchMode
    {
        self.mode
    }

    /// Find every (secret, register) pair that matches
    ///
    /// Results are ordered by secret (insertion order), then by register
    /// (`RegisterId::ALL` order).
    #[must_use]
    pub fn scan<'a>(&'a self, snapshot: &RegisterSnapshot) -> Vec<SecretMatch<'a>>
    {
        let mut found = Vec::new();
        for secret in &self.secrets {
            for (register, value) in snapshot.iter() {
                if self.mode.matches(secret.bits(), value, register.bit_width()) {
                    found.push(SecretMatch { secret, register });
                }
            }
        }
        found
    }
}
