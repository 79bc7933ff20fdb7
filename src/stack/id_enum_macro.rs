/// Declares a string-backed name enum with a catch-all `Custom` variant.
///
/// Known names map to dedicated variants; anything else round-trips through
/// `Custom(String)` unchanged, so unknown names are preserved rather than rejected.
#[macro_export]
macro_rules! define_name_enum {
    (
        $(#[$enum_meta:meta])*
        $enum_name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $name:literal $( | $alias:literal )*
            ),* $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $enum_name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
            Custom(String),
        }

        impl serde::Serialize for $enum_name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.name())
            }
        }

        impl<'de> serde::Deserialize<'de> for $enum_name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Ok(Self::parse(&s))
            }
        }

        impl $enum_name {
            pub fn name(&self) -> &str {
                match self {
                    $(
                        Self::$variant => $name,
                    )*
                    Self::Custom(name) => name,
                }
            }

            /// Parses a name, falling back to `Custom` for unknown names.
            pub fn parse(name: &str) -> Self {
                Self::from_name(name).unwrap_or_else(|| Self::Custom(name.to_string()))
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $(
                        $name $(| $alias)* => Some(Self::$variant),
                    )*
                    _ => None,
                }
            }

            pub fn all_variants() -> &'static [Self] {
                &[
                    $(
                        Self::$variant,
                    )*
                ]
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(self.name())
            }
        }
    };
}
