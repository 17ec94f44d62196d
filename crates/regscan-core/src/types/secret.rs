//! Secrets searched for in register values.

use std::fmt;

use zeroize::Zeroize;

use crate::error::{RegscanError, Result};

/// A named bit pattern the scanner looks for
///
/// The value is stored as an ordered bit sequence: each byte of the original
/// text contributes 8 bits, most significant bit first, bytes in order. So
/// `"A"` (0x41) becomes `0 1 0 0 0 0 0 1`.
///
/// The `Debug` implementation prints the name and bit length only, and the
/// bit buffer is wiped when the secret is dropped.
///
/// ## Example
///
/// ```rust
/// use regscan_core::types::Secret;
///
/// let secret = Secret::from_text("flag", "A");
/// assert_eq!(secret.name(), "flag");
/// assert_eq!(secret.bits(), &[false, true, false, false, false, false, false, true]);
/// assert!(!format!("{secret:?}").contains("true"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Secret
{
    name: String,
    bits: Vec<bool>,
}

impl Secret
{
    /// Encode a text value as a secret (8 bits per byte, MSB first).
    #[must_use]
    pub fn from_text(name: impl Into<String>, value: &str) -> Self
    {
        Self::from_bytes(name, value.as_bytes())
    }

    /// Encode raw bytes as a secret (8 bits per byte, MSB first).
    #[must_use]
    pub fn from_bytes(name: impl Into<String>, value: &[u8]) -> Self
    {
        let bits = value
            .iter()
            .flat_map(|byte| (0..8).rev().map(move |shift| (byte >> shift) & 1 == 1))
            .collect();
        Self {
            name: name.into(),
            bits,
        }
    }

    /// Build a secret directly from a bit sequence.
    #[must_use]
    pub fn from_bits(name: impl Into<String>, bits: Vec<bool>) -> Self
    {
        Self {
            name: name.into(),
            bits,
        }
    }

    /// Caller-chosen identifier, safe to print.
    #[must_use]
    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// The secret's bit sequence.
    #[must_use]
    pub fn bits(&self) -> &[bool]
    {
        &self.bits
    }

    /// Number of bits in the secret.
    #[must_use]
    pub fn bit_len(&self) -> usize
    {
        self.bits.len()
    }
}

impl fmt::Debug for Secret
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("Secret")
            .field("name", &self.name)
            .field("bit_len", &self.bits.len())
            .finish_non_exhaustive()
    }
}

impl Drop for Secret
{
    fn drop(&mut self)
    {
        self.bits.zeroize();
    }
}

/// The fixed set of secrets for one tracing session
///
/// Names are unique; secrets keep their insertion order, which is the order
/// alerts are reported in.
///
/// ## Example
///
/// ```rust
/// use regscan_core::types::{Secret, SecretSet};
///
/// let mut secrets = SecretSet::new();
/// secrets.insert(Secret::from_text("token", "hunter2"))?;
/// assert!(secrets.insert(Secret::from_text("token", "other")).is_err());
/// assert_eq!(secrets.len(), 1);
/// # Ok::<(), regscan_core::error::RegscanError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SecretSet
{
    secrets: Vec<Secret>,
}

impl SecretSet
{
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Build a set from `(name, value)` text pairs.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument`: two pairs share a name
    pub fn from_pairs<I, N, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: AsRef<str>,
    {
        let mut set = Self::new();
        for (name, value) in pairs {
            set.insert(Secret::from_text(name, value.as_ref()))?;
        }
        Ok(set)
    }

    /// Add a secret.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument`: a secret with the same name is already present
    pub fn insert(&mut self, secret: Secret) -> Result<()>
    {
        if self.secrets.iter().any(|existing| existing.name == secret.name) {
            return Err(RegscanError::InvalidArgument(format!(
                "Duplicate secret name `{}`",
                secret.name
            )));
        }
        if secret.bits.is_empty() {
            tracing::warn!(secret = %secret.name, "Secret has an empty value and will never match");
        }
        self.secrets.push(secret);
        Ok(())
    }

    /// Number of secrets.
    #[must_use]
    pub fn len(&self) -> usize
    {
        self.secrets.len()
    }

    /// Whether the set holds no secrets.
    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.secrets.is_empty()
    }

    /// Iterate over the secrets in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Secret>
    {
        self.secrets.iter()
    }
}

impl<'a> IntoIterator for &'a SecretSet
{
    type Item = &'a Secret;
    type IntoIter = std::slice::Iter<'a, Secret>;

    fn into_iter(self) -> Self::IntoIter
    {
        self.iter()
    }
}
