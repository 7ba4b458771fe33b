//! Small-integer coded enums
//!
//! Stored as `SMALLINT`, serialized as lowercase names, and accepted on input
//! as either the integer code or the name.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Behaviour shared by every coded enum
pub trait CodedEnum: Sized + Copy + 'static {
    /// Human-readable type name used in error messages
    const KIND: &'static str;

    /// Look up a variant by its stored code
    fn from_code(code: i64) -> Option<Self>;

    /// Look up a variant by name, ignoring ASCII case
    fn from_name(name: &str) -> Option<Self>;

    /// Parse either a decimal code or a name
    fn parse_loose(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(code) => Self::from_code(code),
            Err(_) => Self::from_name(raw),
        }
    }
}

/// Error returned when a code or name matches no variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    /// Enum that was being parsed
    pub kind: &'static str,
    /// Offending input
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

struct StrictVisitor<T>(PhantomData<T>);

impl<'de, T: CodedEnum> Visitor<'de> for StrictVisitor<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a {} code or name", T::KIND)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<T, E> {
        T::from_code(v).ok_or_else(|| E::custom(format!("unknown {} code {}", T::KIND, v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<T, E> {
        let code = i64::try_from(v).map_err(|_| E::custom(format!("{} code out of range", T::KIND)))?;
        self.visit_i64(code)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
        T::parse_loose(v).ok_or_else(|| E::custom(format!("unknown {} {:?}", T::KIND, v)))
    }
}

/// Deserialize a coded enum strictly (unknown values are an error)
pub fn deserialize_strict<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: CodedEnum,
{
    deserializer.deserialize_any(StrictVisitor(PhantomData))
}

struct LenientVisitor<T>(PhantomData<T>);

impl<'de, T: CodedEnum> Visitor<'de> for LenientVisitor<T> {
    type Value = Option<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a {} code or name", T::KIND)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Option<T>, E> {
        Ok(T::from_code(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Option<T>, E> {
        Ok(i64::try_from(v).ok().and_then(T::from_code))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Option<T>, E> {
        Ok(T::parse_loose(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Option<T>, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Option<T>, E> {
        Ok(None)
    }
}

/// Deserialize a coded enum, mapping unknown or null values to `None`
///
/// Used where an invalid code should be reported as a validation failure
/// rather than a malformed body.
pub fn deserialize_lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: CodedEnum,
{
    deserializer.deserialize_any(LenientVisitor(PhantomData))
}

macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident as $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal => $label:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
        #[repr(i16)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $code, )+
        }

        impl $name {
            /// Every variant in code order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stored integer code
            pub const fn code(self) -> i16 {
                self as i16
            }

            /// Lowercase name
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl CodedEnum for $name {
            const KIND: &'static str = $kind;

            fn from_code(code: i64) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }

            fn from_name(name: &str) -> Option<Self> {
                $(
                    if name.eq_ignore_ascii_case($label) {
                        return Some($name::$variant);
                    }
                )+
                None
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$name as CodedEnum>::parse_loose(s).ok_or_else(|| UnknownVariant {
                    kind: $kind,
                    value: s.to_string(),
                })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserialize_strict(deserializer)
            }
        }
    };
}

coded_enum! {
    /// Publication state of a post
    pub enum PostStatus as "post status" {
        Draft = 1 => "draft",
        Published = 2 => "published",
        Archived = 3 => "archived",
    }
}

coded_enum! {
    /// Workflow state of a contact submission
    pub enum ContactStatus as "contact status" {
        New = 1 => "new",
        Read = 2 => "read",
        Replied = 3 => "replied",
        Archived = 4 => "archived",
    }
}

coded_enum! {
    /// Kind of stored media object
    pub enum FileType as "file type" {
        Image = 1 => "image",
        Video = 2 => "video",
        Document = 3 => "document",
    }
}

coded_enum! {
    /// How a media item is used by a post
    pub enum MediaRole as "media role" {
        Featured = 1 => "featured",
        Gallery = 2 => "gallery",
        Content = 3 => "content",
    }
}

coded_enum! {
    /// Account role
    pub enum UserRole as "user role" {
        User = 1 => "user",
        Editor = 2 => "editor",
        Admin = 3 => "admin",
    }
}

impl Default for PostStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl Default for ContactStatus {
    fn default() -> Self {
        Self::New
    }
}

impl Default for MediaRole {
    fn default() -> Self {
        Self::Content
    }
}
