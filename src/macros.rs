//! Declarative helpers shared by the domain and estimation modules.

/// Declares a fieldless enum stored as text.
///
/// Generates serde renames, `as_str`, `Display` and `FromStr`. Prefixing
/// the declaration with `ordered;` also generates an `ALL` table in
/// declaration order; `ordered(test);` generates it for tests only.
/// Declaration order is significant for enums the estimator iterates
/// (divisions, inspections, tables).
macro_rules! text_enum {
    (ordered; $($def:tt)+) => {
        text_enum! { $($def)+ }
        text_enum! { @all [] $($def)+ }
    };

    (ordered(test); $($def:tt)+) => {
        text_enum! { $($def)+ }
        text_enum! { @all [#[cfg(test)]] $($def)+ }
    };

    (
        @all [$(#[$all_meta:meta])*]
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$all_meta])*
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }
    };

    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant, )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    other => Err($crate::domain::UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}
