//! The decoding engine. A [`Reader`] mirrors the writer's intern tables with
//! dense vectors: ids are assigned in first-occurrence order, so the first
//! occurrence of an id must equal its table's current size and anything
//! beyond that is a malformed stream.
//!
//! Object slots are registered before their fields are decoded (two-phase
//! materialization, see [`crate::handle`]), so a back-reference may observe a
//! slot that is still populating. That is correct: its identity is already
//! stable.

use crate::codec::Decode;
use crate::error::DecodeError;
use std::any::Any;
use std::cmp::Ordering;
use std::io::Read;
use std::rc::Rc;

pub struct Reader<'r> {
    source: &'r mut dyn Read,
    /// Entry n holds the content first announced under id n
    strings: Vec<String>,
    /// Entry n holds the (possibly still populating) object under id n
    objects: Vec<Rc<dyn Any>>,
    user_version: i64,
    user_info: Option<Box<dyn Any>>,
}

impl<'r> Reader<'r> {
    pub fn new(source: &'r mut dyn Read) -> Reader<'r> {
        Reader {
            source,
            strings: Vec::new(),
            objects: Vec::new(),
            user_version: 0,
            user_info: None,
        }
    }

    /// Like [`Reader::new`] with an opaque side channel that codec
    /// implementations can consult through [`Reader::user_info`].
    pub fn with_user_info(source: &'r mut dyn Read, user_info: Box<dyn Any>) -> Reader<'r> {
        Reader { user_info: Some(user_info), ..Reader::new(source) }
    }

    pub fn user_info(&self) -> Option<&dyn Any> {
        self.user_info.as_deref()
    }

    /// The caller's schema tag from the archive header. Zero until
    /// [`Reader::read_root`] has consumed a header.
    pub fn user_version(&self) -> i64 {
        self.user_version
    }

    /// Validates the archive header, stashes the user version, then decodes
    /// the root value. The expected root type is the caller's knowledge; the
    /// stream does not describe itself.
    pub fn read_root<T: Decode>(&mut self) -> Result<T, DecodeError> {
        let encoding_version = self.read::<i64>()?;
        if encoding_version != crate::ENCODING_VERSION {
            return Err(DecodeError::IncompatibleArchiver(encoding_version));
        }
        self.user_version = self.read()?;
        self.read()
    }

    pub fn read<T: Decode>(&mut self) -> Result<T, DecodeError> {
        T::decode(self)
    }

    /// Reads exactly `count` bytes or fails with [`DecodeError::ReadFailed`].
    pub fn read_raw_bytes(&mut self, count: usize) -> Result<Vec<u8>, DecodeError> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(count)?;
        bytes.resize(count, 0);
        self.read_raw_bytes_into(&mut bytes)?;
        Ok(bytes)
    }

    /// Fills `buf` completely or fails with [`DecodeError::ReadFailed`].
    pub fn read_raw_bytes_into(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        self.source.read_exact(buf).map_err(DecodeError::ReadFailed)
    }

    pub(crate) fn read_len(&mut self) -> Result<usize, DecodeError> {
        let len = i64::decode(self)?;
        usize::try_from(len).map_err(|_| DecodeError::Length(len as i128))
    }

    /// The string intern read: a known id answers from the table, a fresh id
    /// must be dense and carries its length-prefixed Utf-8 payload.
    pub(crate) fn read_str(&mut self) -> Result<String, DecodeError> {
        let id = i64::decode(self)?;
        let index = usize::try_from(id).map_err(|_| DecodeError::UnknownId(id))?;
        match index.cmp(&self.strings.len()) {
            Ordering::Less => Ok(self.strings[index].clone()),
            Ordering::Equal => {
                let len = self.read_len()?;
                let bytes = self.read_raw_bytes(len)?;
                let content = String::from_utf8(bytes)?;
                self.strings.push(content.clone());
                Ok(content)
            }
            Ordering::Greater => Err(DecodeError::UnknownId(id)),
        }
    }

    /// Answers a back-reference from the object table, or `None` when `id`
    /// announces the next fresh slot.
    pub(crate) fn object(&self, id: i64) -> Result<Option<Rc<dyn Any>>, DecodeError> {
        let index = usize::try_from(id).map_err(|_| DecodeError::UnknownId(id))?;
        match index.cmp(&self.objects.len()) {
            Ordering::Less => Ok(Some(self.objects[index].clone())),
            Ordering::Equal => Ok(None),
            Ordering::Greater => Err(DecodeError::UnknownId(id)),
        }
    }

    /// Registers a fresh slot under the next dense id. Must happen before the
    /// slot's fields are decoded so cycles resolve to the same instance.
    pub(crate) fn register_object(&mut self, object: Rc<dyn Any>) {
        self.objects.push(object);
    }
}

/// Decodes one value from a complete archive. Bytes past the root value are
/// an error.
pub fn from_bytes<T: Decode>(bytes: &[u8]) -> Result<T, DecodeError> {
    let mut source = bytes;
    let mut reader = Reader::new(&mut source);
    let value = reader.read_root()?;
    drop(reader);
    if source.is_empty() {
        Ok(value)
    } else {
        Err(DecodeError::Trailing(source.len()))
    }
}
