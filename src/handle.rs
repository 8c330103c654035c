//! The reference value kind. A [`Handle`] is a shared, identity bearing
//! archive object: however many times it occurs in the encoded graph, its
//! payload is written once and every later occurrence is a single id. On
//! decode, every occurrence resolves to the same allocation, so shared
//! structure and cycles survive the round trip.
//!
//! Decoding is two-phase. The slot is default-constructed and registered in
//! the reader's object table *before* its fields are decoded, which is what
//! lets a cycle through the slot resolve to the same (still populating)
//! instance. This is why every handle target needs `Default`: its identity
//! must be materializable before its content is known.

use crate::codec::{Decode, Encode};
use crate::error::{DecodeError, EncodeError};
use crate::reader::Reader;
use crate::schema::{self, Record};
use crate::writer::Writer;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// A shared handle to an archive object. Clones share identity; the writer
/// interns by allocation address, not by content.
pub type Handle<T> = Rc<RefCell<T>>;

/// Wraps a value into a freshly allocated [`Handle`].
pub fn handle<T>(value: T) -> Handle<T> {
    Rc::new(RefCell::new(value))
}

impl<T: Record> Encode for Rc<RefCell<T>> {
    fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        let erased: Rc<dyn Any> = self.clone();
        if w.intern_object(erased)? {
            schema::encode_record(&*self.borrow(), w)?;
        }
        Ok(())
    }
}

impl<T: Record> Decode for Rc<RefCell<T>> {
    fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let id = i64::decode(r)?;
        if let Some(existing) = r.object(id)? {
            // cycle resolution point: the slot may still be populating
            return existing
                .downcast::<RefCell<T>>()
                .map_err(|_| DecodeError::WrongType(id));
        }
        let instance = Rc::new(RefCell::new(T::default()));
        let erased: Rc<dyn Any> = instance.clone();
        r.register_object(erased);
        {
            let mut slot = instance.borrow_mut();
            schema::decode_fields(&mut *slot, r)?;
            slot.awake();
        }
        Ok(instance)
    }
}
