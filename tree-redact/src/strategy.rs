//! Built-in transform strategies.
//!
//! Strategies are pure value-to-string transformations. They do not traverse
//! trees, match keys or make runtime decisions about sensitivity; the walker
//! only calls them on values it already decided to redact.

use std::borrow::Cow;
#[cfg(feature = "hash")]
use std::str::FromStr;

#[cfg(feature = "hash")]
use crate::error::ConfigurationError;
use crate::{error::BoxError, node::Node, transform::Transform};

/// Default replacement text for the constant strategy.
pub const REDACTED_PLACEHOLDER: &str = "REDACTED";

/// Keeps selected segments visible while masking the remainder.
///
/// Operates on Unicode scalar values. If the visible spans cover the whole
/// value, the output is unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeepConfig {
    visible_prefix: usize,
    visible_suffix: usize,
    mask_char: char,
}

impl KeepConfig {
    /// Keeps only the first `visible_prefix` characters.
    #[must_use]
    pub fn first(visible_prefix: usize) -> Self {
        Self::both(visible_prefix, 0)
    }

    /// Keeps only the last `visible_suffix` characters.
    #[must_use]
    pub fn last(visible_suffix: usize) -> Self {
        Self::both(0, visible_suffix)
    }

    /// Keeps leading and trailing characters visible.
    #[must_use]
    pub fn both(visible_prefix: usize, visible_suffix: usize) -> Self {
        Self {
            visible_prefix,
            visible_suffix,
            mask_char: '*',
        }
    }

    #[must_use]
    pub fn with_mask_char(mut self, mask_char: char) -> Self {
        self.mask_char = mask_char;
        self
    }

    fn apply_to(&self, value: &str) -> String {
        let total = value.chars().count();
        if self.visible_prefix + self.visible_suffix >= total {
            return value.to_string();
        }
        let hidden = self.visible_prefix..total - self.visible_suffix;
        value
            .chars()
            .enumerate()
            .map(|(index, ch)| if hidden.contains(&index) { self.mask_char } else { ch })
            .collect()
    }
}

/// Masks selected segments while leaving the remainder unchanged.
///
/// If the masked spans cover the whole value, every character is masked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaskConfig {
    masked_prefix: usize,
    masked_suffix: usize,
    mask_char: char,
}

impl MaskConfig {
    /// Masks only the first `masked_prefix` characters.
    #[must_use]
    pub fn first(masked_prefix: usize) -> Self {
        Self::both(masked_prefix, 0)
    }

    /// Masks only the last `masked_suffix` characters.
    #[must_use]
    pub fn last(masked_suffix: usize) -> Self {
        Self::both(0, masked_suffix)
    }

    #[must_use]
    pub fn both(masked_prefix: usize, masked_suffix: usize) -> Self {
        Self {
            masked_prefix,
            masked_suffix,
            mask_char: '*',
        }
    }

    #[must_use]
    pub fn with_mask_char(mut self, mask_char: char) -> Self {
        self.mask_char = mask_char;
        self
    }

    fn apply_to(&self, value: &str) -> String {
        let total = value.chars().count();
        let suffix_start = total.saturating_sub(self.masked_suffix);
        value
            .chars()
            .enumerate()
            .map(|(index, ch)| {
                if index < self.masked_prefix || index >= suffix_start {
                    self.mask_char
                } else {
                    ch
                }
            })
            .collect()
    }
}

/// Digest used by [`Strategy::Hash`].
#[cfg(feature = "hash")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha512,
}

#[cfg(feature = "hash")]
impl FromStr for HashAlgorithm {
    type Err = ConfigurationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "sha512" | "sha-512" => Ok(Self::Sha512),
            _ => Err(ConfigurationError::UnknownAlgorithm(name.to_string())),
        }
    }
}

/// Text encoding of a digest.
#[cfg(feature = "hash")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashEncoding {
    Hex,
    Base64,
}

#[cfg(feature = "hash")]
impl FromStr for HashEncoding {
    type Err = ConfigurationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "hex" => Ok(Self::Hex),
            "base64" => Ok(Self::Base64),
            _ => Err(ConfigurationError::UnknownEncoding(name.to_string())),
        }
    }
}

/// Configuration for digest-based pseudonymization.
///
/// Equal inputs hash to equal outputs, so redacted logs can still be
/// correlated. Add a salt to stop dictionary lookups of short values.
#[cfg(feature = "hash")]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashConfig {
    algorithm: HashAlgorithm,
    encoding: HashEncoding,
    salt: Option<String>,
}

#[cfg(feature = "hash")]
impl HashConfig {
    #[must_use]
    pub fn new(algorithm: HashAlgorithm, encoding: HashEncoding) -> Self {
        Self {
            algorithm,
            encoding,
            salt: None,
        }
    }

    /// Parses algorithm and encoding names, e.g. `("sha512", "base64")`.
    pub fn parse(algorithm: &str, encoding: &str) -> Result<Self, ConfigurationError> {
        Ok(Self::new(algorithm.parse()?, encoding.parse()?))
    }

    #[must_use]
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    fn apply_to(&self, value: &str) -> String {
        use base64::Engine as _;
        use sha2::{Digest, Sha256, Sha512};

        fn digest<D: Digest>(salt: Option<&str>, value: &str) -> Vec<u8> {
            let mut hasher = D::new();
            if let Some(salt) = salt {
                hasher.update(salt.as_bytes());
            }
            hasher.update(value.as_bytes());
            hasher.finalize().to_vec()
        }

        let salt = self.salt.as_deref();
        let bytes = match self.algorithm {
            HashAlgorithm::Sha256 => digest::<Sha256>(salt, value),
            HashAlgorithm::Sha512 => digest::<Sha512>(salt, value),
        };
        match self.encoding {
            HashEncoding::Hex => hex::encode(bytes),
            HashEncoding::Base64 => base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }
}

#[cfg(feature = "hash")]
impl Default for HashConfig {
    fn default() -> Self {
        Self::new(HashAlgorithm::Sha256, HashEncoding::Hex)
    }
}

/// A built-in redaction strategy.
///
/// Every strategy works on the text form of the value (see
/// [`Node::as_text`]) and returns an owned `String`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Replace the value with fixed text.
    Replace { text: Cow<'static, str> },
    /// Keep configured segments visible, mask everything else.
    Keep(KeepConfig),
    /// Mask configured segments, leave the remainder.
    Mask(MaskConfig),
    /// Replace the value with its salted digest.
    #[cfg(feature = "hash")]
    Hash(HashConfig),
}

impl Strategy {
    /// Replacement with [`REDACTED_PLACEHOLDER`].
    #[must_use]
    pub fn default_replace() -> Self {
        Self::replace(REDACTED_PLACEHOLDER)
    }

    #[must_use]
    pub fn replace<T>(text: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        Self::Replace { text: text.into() }
    }

    #[must_use]
    pub fn keep_first(visible_prefix: usize) -> Self {
        Self::Keep(KeepConfig::first(visible_prefix))
    }

    #[must_use]
    pub fn keep_last(visible_suffix: usize) -> Self {
        Self::Keep(KeepConfig::last(visible_suffix))
    }

    #[must_use]
    pub fn mask_first(masked_prefix: usize) -> Self {
        Self::Mask(MaskConfig::first(masked_prefix))
    }

    #[must_use]
    pub fn mask_last(masked_suffix: usize) -> Self {
        Self::Mask(MaskConfig::last(masked_suffix))
    }

    /// SHA-256, hex encoded.
    #[cfg(feature = "hash")]
    #[must_use]
    pub fn sha256() -> Self {
        Self::Hash(HashConfig::default())
    }

    /// Applies the strategy to a string. Total; never fails.
    #[must_use]
    pub fn apply_to(&self, value: &str) -> String {
        match self {
            Strategy::Replace { text } => text.clone().into_owned(),
            Strategy::Keep(config) => config.apply_to(value),
            Strategy::Mask(config) => config.apply_to(value),
            #[cfg(feature = "hash")]
            Strategy::Hash(config) => config.apply_to(value),
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::default_replace()
    }
}

impl Transform for Strategy {
    fn transform(&self, value: &Node) -> Result<String, BoxError> {
        Ok(self.apply_to(&value.as_text()))
    }

    fn name(&self) -> &str {
        match self {
            Strategy::Replace { .. } => "replace",
            Strategy::Keep(_) => "keep",
            Strategy::Mask(_) => "mask",
            #[cfg(feature = "hash")]
            Strategy::Hash(config) => match config.algorithm {
                HashAlgorithm::Sha256 => "sha256",
                HashAlgorithm::Sha512 => "sha512",
            },
        }
    }

    fn short_name(&self) -> &str {
        match self {
            Strategy::Replace { .. } => "r",
            Strategy::Keep(_) => "k",
            Strategy::Mask(_) => "m",
            #[cfg(feature = "hash")]
            Strategy::Hash(config) => match config.algorithm {
                HashAlgorithm::Sha256 => "s256",
                HashAlgorithm::Sha512 => "s512",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_ignores_input() {
        assert_eq!(Strategy::default_replace().apply_to("secret"), "REDACTED");
        assert_eq!(Strategy::replace("<hidden>").apply_to(""), "<hidden>");
    }

    #[test]
    fn keep_masks_the_middle() {
        assert_eq!(Strategy::keep_last(4).apply_to("4111111111111111"), "************1111");
        assert_eq!(Strategy::keep_first(2).apply_to("abcdef"), "ab****");
        let both = Strategy::Keep(KeepConfig::both(2, 2).with_mask_char('#'));
        assert_eq!(both.apply_to("abcdef"), "ab##ef");
    }

    #[test]
    fn keep_leaves_short_values_alone() {
        assert_eq!(Strategy::keep_last(4).apply_to("abc"), "abc");
        assert_eq!(Strategy::keep_last(4).apply_to(""), "");
    }

    #[test]
    fn mask_covers_edges() {
        assert_eq!(Strategy::mask_first(2).apply_to("abcdef"), "**cdef");
        assert_eq!(Strategy::mask_last(3).apply_to("abcdef"), "abc***");
        assert_eq!(Strategy::Mask(MaskConfig::both(3, 3)).apply_to("abcd"), "****");
    }

    #[test]
    fn keep_and_mask_count_scalar_values() {
        assert_eq!(Strategy::keep_first(2).apply_to("秘密数据"), "秘密**");
        assert_eq!(Strategy::mask_last(1).apply_to("secret🔒"), "secret*");
    }

    #[test]
    fn transform_uses_text_form() {
        let strategy = Strategy::keep_last(2);
        assert_eq!(strategy.transform(&Node::from(123_456_i64)).unwrap(), "****56");
        assert_eq!(strategy.name(), "keep");
        assert_eq!(strategy.short_name(), "k");
    }

    #[cfg(feature = "hash")]
    #[test]
    fn sha256_hex_is_stable() {
        let strategy = Strategy::sha256();
        assert_eq!(
            strategy.apply_to("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(strategy.name(), "sha256");
    }

    #[cfg(feature = "hash")]
    #[test]
    fn salt_changes_digest() {
        let plain = Strategy::Hash(HashConfig::default());
        let salted = Strategy::Hash(HashConfig::default().with_salt("pepper"));
        assert_ne!(plain.apply_to("abc"), salted.apply_to("abc"));
    }

    #[cfg(feature = "hash")]
    #[test]
    fn hash_names_parse() {
        let config = HashConfig::parse("SHA512", "base64").unwrap();
        assert_eq!(config.algorithm, HashAlgorithm::Sha512);
        assert_eq!(config.encoding, HashEncoding::Base64);
        // 64-byte digest -> 88 base64 characters
        assert_eq!(config.apply_to("abc").len(), 88);
    }

    #[cfg(feature = "hash")]
    #[test]
    fn unknown_hash_names_are_configuration_errors() {
        assert!(matches!(
            "md5".parse::<HashAlgorithm>(),
            Err(ConfigurationError::UnknownAlgorithm(name)) if name == "md5"
        ));
        assert!(matches!(
            "base32".parse::<HashEncoding>(),
            Err(ConfigurationError::UnknownEncoding(name)) if name == "base32"
        ));
    }
}
