//! Synonym → enumeration lookup
//!
//! Source documents carry codes as raw text. A [`SynonymEnum`] declares the
//! canonical code for each variant; [`SynonymTables`] layers extra synonyms
//! (from configuration) on top so several spellings decode to one variant.

use std::collections::HashMap;
use std::fmt;
use tracing::{trace, warn};

/// An enumeration that can be decoded from source codes
pub trait SynonymEnum: Copy + PartialEq + fmt::Debug + 'static {
    /// Name of the enumeration, used as the synonym table key
    const ENUM_NAME: &'static str;

    /// All variants in declaration order
    const VARIANTS: &'static [Self];

    /// Canonical source code of this variant
    fn code(&self) -> &'static str;

    /// Zero-based declaration position
    fn ordinal(&self) -> usize;

    /// Decode a canonical code
    fn from_code(code: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|v| v.code() == code)
    }
}

/// Declare an enum whose variants decode from canonical source codes
///
/// ```
/// synmap_core::synonym_enum! {
///     /// Direction of a payment leg
///     pub enum PayerReceiver: "PayerReceiverEnum" {
///         Payer => "Payer",
///         Receiver => "Receiver",
///     }
/// }
///
/// use synmap_core::SynonymEnum;
/// assert_eq!(PayerReceiver::from_code("Receiver"), Some(PayerReceiver::Receiver));
/// assert_eq!(PayerReceiver::Receiver.ordinal(), 1);
/// ```
#[macro_export]
macro_rules! synonym_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $enum_name:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::SynonymEnum for $name {
            const ENUM_NAME: &'static str = $enum_name;
            const VARIANTS: &'static [Self] = &[ $( $name::$variant ),+ ];

            fn code(&self) -> &'static str {
                match self {
                    $( $name::$variant => $code ),+
                }
            }

            fn ordinal(&self) -> usize {
                *self as usize
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::SynonymEnum::code(self))
            }
        }
    };
}

/// Synonym tables keyed by enumeration name
#[derive(Debug, Clone, Default)]
pub struct SynonymTables {
    tables: HashMap<String, HashMap<String, String>>,
}

impl SynonymTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `synonym` as an alternative spelling of `code` in `enum_name`
    pub fn insert(
        &mut self,
        enum_name: impl Into<String>,
        synonym: impl Into<String>,
        code: impl Into<String>,
    ) {
        self.tables
            .entry(enum_name.into())
            .or_default()
            .insert(synonym.into(), code.into());
    }

    /// Merge whole tables, later entries win
    pub fn extend<'a>(
        &mut self,
        tables: impl IntoIterator<Item = (&'a String, &'a HashMap<String, String>)>,
    ) {
        for (enum_name, synonyms) in tables {
            let table = self.tables.entry(enum_name.clone()).or_default();
            for (synonym, code) in synonyms {
                table.insert(synonym.clone(), code.clone());
            }
        }
    }

    /// Synonyms registered for one enumeration
    pub fn table(&self, enum_name: &str) -> Option<&HashMap<String, String>> {
        self.tables.get(enum_name)
    }

    /// Decode a raw source code
    ///
    /// Registered synonyms take precedence over canonical codes. Surrounding
    /// whitespace is ignored.
    pub fn lookup<E: SynonymEnum>(&self, raw: &str) -> Option<E> {
        let raw = raw.trim();
        if let Some(code) = self.tables.get(E::ENUM_NAME).and_then(|t| t.get(raw)) {
            let decoded = E::from_code(code);
            if decoded.is_none() {
                warn!(
                    "Synonym '{}' maps to unknown {} code '{}'",
                    raw,
                    E::ENUM_NAME,
                    code
                );
            }
            return decoded;
        }

        let decoded = E::from_code(raw);
        trace!("Decoding '{}' as {}: {:?}", raw, E::ENUM_NAME, decoded);
        decoded
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
