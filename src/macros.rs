/// Declares a closed set of values that appear on the wire as an integer tag.
///
/// Generates the enum itself plus a [`WireEnum`](crate::codec::WireEnum)
/// impl mapping each variant to and from its raw value.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::codec::WireEnum for $name {
            const NAME: &'static str = stringify!($name);

            fn from_raw(raw: u32) -> Option<Self> {
                match raw {
                    $( v if v == $value => Some(Self::$variant), )+
                    _ => None,
                }
            }

            fn raw(self) -> u32 {
                match self {
                    $( Self::$variant => $value, )+
                }
            }
        }
    };
}
