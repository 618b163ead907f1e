/// Declares a closed union whose first wire byte (and JSON `"type"` field)
/// selects the variant. Generates the enum, `Kinded`, `Packable`, `From`
/// for every variant payload, and the tagged serde impls.
macro_rules! tagged_union {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident as $label:literal {
            $($(#[$vmeta:meta])* $variant:ident($inner:ty) = $tag:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        $vis enum $name {
            $($(#[$vmeta])* $variant($inner)),+
        }

        impl $crate::ser::Kinded for $name {
            fn kind(&self) -> u8 {
                match self {
                    $(Self::$variant(_) => $tag),+
                }
            }
        }

        impl $crate::ser::Packable for $name {
            fn pack(&self, p: &mut $crate::ser::Packer) -> Result<(), $crate::errors::CodecError> {
                p.u8($crate::ser::Kinded::kind(self));
                match self {
                    $(Self::$variant(inner) => $crate::ser::Packable::pack(inner, p)),+
                }
            }

            fn unpack(u: &mut $crate::ser::Unpacker<'_>) -> Result<Self, $crate::errors::CodecError> {
                u.enter($label)?;
                let value = match u.u8()? {
                    $($tag => <$inner as $crate::ser::Packable>::unpack(u).map(Self::$variant),)+
                    other => Err($crate::errors::CodecError::unknown_kind($label, other)),
                };
                u.leave();
                value
            }

            fn validate(&self, params: &$crate::params::ProtocolParameters) -> Result<(), $crate::errors::CodecError> {
                match self {
                    $(Self::$variant(inner) => $crate::ser::Packable::validate(inner, params)),+
                }
            }
        }

        $(
            impl From<$inner> for $name {
                fn from(inner: $inner) -> Self {
                    Self::$variant(inner)
                }
            }
        )+

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                match self {
                    $(Self::$variant(inner) => ::serde::Serialize::serialize(
                        &$crate::json::Tagged { kind: $tag, inner },
                        s,
                    )),+
                }
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                use ::serde::de::Error as _;
                let value = <::serde_json::Value as ::serde::Deserialize>::deserialize(d)?;
                match $crate::json::kind_of(&value).map_err(D::Error::custom)? {
                    $($tag => ::serde_json::from_value::<$inner>(value)
                        .map(Self::$variant)
                        .map_err(D::Error::custom),)+
                    other => Err(D::Error::custom(format!("unknown {} type {other}", $label))),
                }
            }
        }
    };
}

/// Fixed-length byte identifiers: hex `Display`/`Debug`, 0x-hex serde,
/// raw `Packable`, and slice conversion.
macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub const LENGTH: usize = $len;

            #[must_use]
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            #[must_use]
            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            #[must_use]
            pub fn to_hex(&self) -> String {
                $crate::json::prefix_hex::encode(self.0)
            }

            pub fn from_hex(s: &str) -> Result<Self, $crate::errors::CodecError> {
                <[u8; $len] as $crate::json::prefix_hex::FromPrefixHex>::from_prefix_hex(s)
                    .map(Self)
                    .map_err(|reason| $crate::errors::CodecError::schema(stringify!($name), reason))
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = $crate::errors::CodecError;
            fn try_from(b: &[u8]) -> Result<Self, Self::Error> {
                if b.len() != $len {
                    return Err($crate::errors::CodecError::malformed(
                        stringify!($name),
                        format!("expected {} bytes, got {}", $len, b.len()),
                    ));
                }
                let mut arr = [0u8; $len];
                arr.copy_from_slice(b);
                Ok(Self(arr))
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl $crate::ser::Packable for $name {
            fn pack(&self, p: &mut $crate::ser::Packer) -> Result<(), $crate::errors::CodecError> {
                p.bytes(&self.0);
                Ok(())
            }
            fn unpack(u: &mut $crate::ser::Unpacker<'_>) -> Result<Self, $crate::errors::CodecError> {
                u.array().map(Self)
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                $crate::json::prefix_hex::serialize(&self.0, s)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                $crate::json::prefix_hex::deserialize(d).map(Self)
            }
        }
    };
}
