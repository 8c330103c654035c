//! The per-type encode/decode contract and its built-in instances. Dispatch
//! over the three value kinds happens here through instance selection alone:
//! the string instances route through the writer's intern path, the shared
//! handle instances (see [`crate::handle`]) through the object intern path,
//! and everything else encodes in place. The engine never inspects types at
//! runtime.
//!
//! Containers carry an i64 length prefix. A mapping is written as its key
//! sequence followed by its value sequence, both drawn from one snapshot of
//! the map, so the two orders always agree; emission order itself is
//! implementation defined. Sets are written as plain sequences.

use crate::error::{DecodeError, EncodeError};
use crate::reader::Reader;
use crate::writer::Writer;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;

/// Writes the wire image of a value through the given writer.
pub trait Encode {
    fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError>;
}

/// Reads a value back from its wire image.
pub trait Decode: Sized {
    fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError>;
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        (**self).encode(w)
    }
}

/// Wires an [`Atom`] implementor into [`Encode`] and [`Decode`]: its byte
/// image travels as-is. Every built-in scalar is declared through this; a
/// crate downstream can do the same for its own fixed width types.
#[macro_export]
macro_rules! atom_codec {
    ($($ty:ty),*) => {$(
        impl $crate::Encode for $ty {
            fn encode(&self, w: &mut $crate::Writer<'_>) -> Result<(), $crate::EncodeError> {
                w.write_raw_bytes($crate::Atom::to_image(*self).as_ref())
            }
        }

        impl $crate::Decode for $ty {
            fn decode(r: &mut $crate::Reader<'_>) -> Result<Self, $crate::DecodeError> {
                let mut image = <$ty as $crate::Atom>::Image::default();
                r.read_raw_bytes_into(image.as_mut())?;
                Ok(<$ty as $crate::Atom>::from_image(image))
            }
        }
    )*}
}

atom_codec!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64, bool);

// Platform-native widths always travel as their 64 bit counterparts.

impl Encode for usize {
    fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        (*self as u64).encode(w)
    }
}

impl Decode for usize {
    fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let value = u64::decode(r)?;
        usize::try_from(value).map_err(|_| DecodeError::Length(value as i128))
    }
}

impl Encode for isize {
    fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        (*self as i64).encode(w)
    }
}

impl Decode for isize {
    fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let value = i64::decode(r)?;
        isize::try_from(value).map_err(|_| DecodeError::Length(value as i128))
    }
}

impl Encode for str {
    fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        w.write_str(self)
    }
}

impl Encode for String {
    fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        w.write_str(self)
    }
}

impl Decode for String {
    fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        r.read_str()
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        w.write_len(self.len())?;
        for item in self {
            item.encode(w)?;
        }
        Ok(())
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        self.as_slice().encode(w)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let len = r.read_len()?;
        let mut items = Vec::new();
        items.try_reserve(len)?;
        for _ in 0..len {
            items.push(T::decode(r)?);
        }
        Ok(items)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        match self {
            None => false.encode(w),
            Some(value) => {
                true.encode(w)?;
                value.encode(w)
            }
        }
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        if bool::decode(r)? {
            Ok(Some(T::decode(r)?))
        } else {
            Ok(None)
        }
    }
}

macro_rules! map_codec {
    ($map:ident, $($bound:path),*) => {
        impl<K: Encode, V: Encode> Encode for $map<K, V> {
            fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
                // one snapshot so the key and value orders agree
                let pairs: Vec<(&K, &V)> = self.iter().collect();
                w.write_len(pairs.len())?;
                for (key, _) in &pairs {
                    key.encode(w)?;
                }
                w.write_len(pairs.len())?;
                for (_, value) in &pairs {
                    value.encode(w)?;
                }
                Ok(())
            }
        }

        impl<K: Decode $(+ $bound)*, V: Decode> Decode for $map<K, V> {
            fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
                let keys = Vec::<K>::decode(r)?;
                let values = Vec::<V>::decode(r)?;
                if keys.len() != values.len() {
                    return Err(DecodeError::Pairing(keys.len(), values.len()));
                }
                Ok(keys.into_iter().zip(values).collect())
            }
        }
    }
}

map_codec!(HashMap, Eq, Hash);
map_codec!(BTreeMap, Ord);

macro_rules! set_codec {
    ($set:ident, $($bound:path),*) => {
        impl<T: Encode> Encode for $set<T> {
            fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
                w.write_len(self.len())?;
                for item in self {
                    item.encode(w)?;
                }
                Ok(())
            }
        }

        impl<T: Decode $(+ $bound)*> Decode for $set<T> {
            fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
                Ok(Vec::<T>::decode(r)?.into_iter().collect())
            }
        }
    }
}

set_codec!(HashSet, Eq, Hash);
set_codec!(BTreeSet, Ord);

/// Declares a fieldless enum backed by an integer scalar and wires it into
/// the codec. The enum travels as its representation alone; decoding a scalar
/// with no corresponding variant fails with [`DecodeError::Discriminant`].
/// Derive at least `Clone` and `Copy` on the declared enum.
///
/// ```
/// archiv::scalar_enum! {
///     #[derive(Debug, PartialEq, Clone, Copy)]
///     pub enum Wochentag: u8 {
///         Montag = 0,
///         Dienstag = 1,
///     }
/// }
/// ```
#[macro_export]
macro_rules! scalar_enum {
    ($(#[$meta:meta])* $vis:vis enum $name:ident : $repr:ty {
        $($(#[$vmeta:meta])* $variant:ident = $value:expr),+ $(,)?
    }) => {
        $(#[$meta])*
        #[repr($repr)]
        $vis enum $name {
            $($(#[$vmeta])* $variant = $value),+
        }

        impl $crate::Encode for $name {
            fn encode(&self, w: &mut $crate::Writer<'_>) -> Result<(), $crate::EncodeError> {
                $crate::Encode::encode(&(*self as $repr), w)
            }
        }

        impl $crate::Decode for $name {
            fn decode(r: &mut $crate::Reader<'_>) -> Result<Self, $crate::DecodeError> {
                let raw = <$repr as $crate::Decode>::decode(r)?;
                match raw {
                    $(x if x == $value => Ok($name::$variant),)+
                    x => Err($crate::DecodeError::Discriminant(x as i128)),
                }
            }
        }
    }
}
