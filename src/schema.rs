//! Declarative wire shapes for record types. A record declares an ordered
//! list of field descriptors; that order and the field types are the record's
//! wire contract. Both sides of an archive must agree on it: a reordered or
//! retyped field list decodes into garbage or a read failure.
//!
//! Encoding walks the descriptors in order and projects each field through
//! its codec. Decoding default-constructs the record, fills each field in
//! declaration order, then runs [`Record::awake`].

use crate::codec::{Decode, Encode};
use crate::error::{DecodeError, EncodeError};
use crate::reader::Reader;
use crate::writer::Writer;

/// One field of a record: a read-only projection for the encoder and an
/// in-place setter for the decoder, composed into boxed codec thunks.
pub struct FieldDef<R> {
    encode: Box<dyn Fn(&R, &mut Writer<'_>) -> Result<(), EncodeError>>,
    decode: Box<dyn Fn(&mut R, &mut Reader<'_>) -> Result<(), DecodeError>>,
}

impl<R: 'static> FieldDef<R> {
    pub fn new<V: Encode + Decode + 'static>(get: fn(&R) -> &V, set: fn(&mut R, V)) -> FieldDef<R> {
        FieldDef {
            encode: Box::new(move |record, w| get(record).encode(w)),
            decode: Box::new(move |record, r| {
                set(record, V::decode(r)?);
                Ok(())
            }),
        }
    }
}

/// A record type with a declared field order. `Default` supplies the empty
/// instance the decoder fills; [`Record::awake`] runs once all fields are in
/// place and may derive state the schema doesn't carry.
pub trait Record: Default + 'static {
    fn fields() -> Vec<FieldDef<Self>>;

    fn awake(&mut self) {}
}

pub fn encode_record<R: Record>(record: &R, w: &mut Writer<'_>) -> Result<(), EncodeError> {
    for field in R::fields() {
        (field.encode)(record, w)?;
    }
    Ok(())
}

pub fn decode_record<R: Record>(r: &mut Reader<'_>) -> Result<R, DecodeError> {
    let mut record = R::default();
    decode_fields(&mut record, r)?;
    record.awake();
    Ok(record)
}

pub(crate) fn decode_fields<R: Record>(record: &mut R, r: &mut Reader<'_>) -> Result<(), DecodeError> {
    for field in R::fields() {
        (field.decode)(record, r)?;
    }
    Ok(())
}

/// Wires a [`Record`] into [`Encode`] and [`Decode`] so it can be archived
/// in place or behind a [`crate::Handle`].
#[macro_export]
macro_rules! record_codec {
    ($ty:ty) => {
        impl $crate::Encode for $ty {
            fn encode(&self, w: &mut $crate::Writer<'_>) -> Result<(), $crate::EncodeError> {
                $crate::schema::encode_record(self, w)
            }
        }

        impl $crate::Decode for $ty {
            fn decode(r: &mut $crate::Reader<'_>) -> Result<Self, $crate::DecodeError> {
                $crate::schema::decode_record(r)
            }
        }
    };
}
