//! The encoding engine. A [`Writer`] owns the intern tables for one archive:
//! each distinct string and each distinct shared object is assigned a dense
//! id equal to its table's size at assignment time. The first occurrence
//! emits the id followed by the full payload; every later occurrence emits
//! only the id.
//!
//! A writer serves exactly one archive and is discarded afterwards; its
//! tables are not reusable, and a failed write leaves them in whatever
//! partial state they reached.

use crate::codec::Encode;
use crate::error::EncodeError;
use std::any::Any;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

pub struct Writer<'w> {
    sink: &'w mut dyn Write,
    /// Map string content -> entry in the table
    strings: HashMap<String, i64>,
    /// Map allocation address -> entry in the table
    objects: HashMap<*const (), i64>,
    /// Keeps interned allocations alive so addresses stay unambiguous
    /// for the lifetime of this archive
    retained: Vec<Rc<dyn Any>>,
    user_info: Option<Box<dyn Any>>,
}

impl<'w> Writer<'w> {
    pub fn new(sink: &'w mut dyn Write) -> Writer<'w> {
        Writer {
            sink,
            strings: HashMap::new(),
            objects: HashMap::new(),
            retained: Vec::new(),
            user_info: None,
        }
    }

    /// Like [`Writer::new`] with an opaque side channel that codec
    /// implementations can consult through [`Writer::user_info`].
    pub fn with_user_info(sink: &'w mut dyn Write, user_info: Box<dyn Any>) -> Writer<'w> {
        Writer { user_info: Some(user_info), ..Writer::new(sink) }
    }

    pub fn user_info(&self) -> Option<&dyn Any> {
        self.user_info.as_deref()
    }

    /// Emits the archive header, then the root value. The format version is
    /// fixed; `version` is the caller's own schema tag and travels opaquely.
    pub fn write_root<T: Encode + ?Sized>(&mut self, value: &T, version: i64) -> Result<(), EncodeError> {
        self.write(&crate::ENCODING_VERSION)?;
        self.write(&version)?;
        self.write(value)
    }

    pub fn write<T: Encode + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        value.encode(self)
    }

    pub fn write_raw_bytes(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.sink.write_all(bytes).map_err(EncodeError::WriteFailed)
    }

    pub(crate) fn write_len(&mut self, len: usize) -> Result<(), EncodeError> {
        let len = i64::try_from(len).map_err(|_| EncodeError::Length(len as u128))?;
        self.write_raw_bytes(&len.to_be_bytes())
    }

    /// The string intern path: the first occurrence of a content emits its
    /// fresh id and the length-prefixed Utf-8 payload, later occurrences
    /// only the id.
    pub(crate) fn write_str(&mut self, s: &str) -> Result<(), EncodeError> {
        if let Some(&id) = self.strings.get(s) {
            return self.write_raw_bytes(&id.to_be_bytes());
        }
        let id = self.strings.len() as i64;
        self.strings.insert(s.to_owned(), id);
        self.write_raw_bytes(&id.to_be_bytes())?;
        self.write_len(s.len())?;
        self.write_raw_bytes(s.as_bytes())
    }

    /// The object intern path, keyed by allocation address. Emits the id and
    /// reports whether the payload still has to follow.
    pub(crate) fn intern_object(&mut self, object: Rc<dyn Any>) -> Result<bool, EncodeError> {
        let address = Rc::as_ptr(&object) as *const ();
        if let Some(&id) = self.objects.get(&address) {
            self.write_raw_bytes(&id.to_be_bytes())?;
            return Ok(false);
        }
        let id = self.objects.len() as i64;
        self.objects.insert(address, id);
        self.retained.push(object);
        self.write_raw_bytes(&id.to_be_bytes())?;
        Ok(true)
    }
}

/// Encodes one value into a fresh archive and returns its bytes.
pub fn to_bytes<T: Encode + ?Sized>(value: &T, version: i64) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    let mut writer = Writer::new(&mut buf);
    writer.write_root(value, version)?;
    drop(writer);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::{to_bytes, Writer};
    use crate::error::EncodeError;
    use std::io::{self, Write};

    #[test]
    fn header_then_body() {
        let bytes = to_bytes(&42u32, 0).unwrap();
        assert_eq!(bytes, [
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, // archive format version
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // user version
            0x00, 0x00, 0x00, 0x2a,                         // the value
        ]);
    }

    #[test]
    fn user_version_travels_in_the_header() {
        let bytes = to_bytes(&0u8, -3).unwrap();
        assert_eq!(bytes[8..16], (-3i64).to_be_bytes());
    }

    #[test]
    fn strings_are_interned() {
        let words = vec!["hi".to_string(), "hi".to_string(), "hi".to_string()];
        let bytes = to_bytes(&words, 0).unwrap();
        assert_eq!(bytes, [
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, // archive format version
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // user version
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, // three elements
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // id 0, fresh: payload follows
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, // two bytes of Utf-8
            0x68, 0x69,                                     // 'hi'
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // id 0 again
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // id 0 again
        ]);
    }

    #[test]
    fn distinct_contents_get_dense_ids() {
        let words = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        let bytes = to_bytes(&words, 0).unwrap();
        let body = &bytes[24..];
        assert_eq!(body[0..8], 0i64.to_be_bytes());   // "a" -> id 0
        assert_eq!(body[17..25], 1i64.to_be_bytes()); // "b" -> id 1
        assert_eq!(body[34..42], 0i64.to_be_bytes()); // "a" again
        assert_eq!(body.len(), 42);
    }

    struct Brim;

    impl Write for Brim {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::WriteZero, "full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn short_write_surfaces() {
        let mut sink = Brim;
        let mut writer = Writer::new(&mut sink);
        assert!(matches!(
            writer.write_root(&1u8, 0),
            Err(EncodeError::WriteFailed(_))
        ));
    }

    #[test]
    fn user_info_side_channel() {
        let mut buf = Vec::new();
        let writer = Writer::with_user_info(&mut buf, Box::new(7u32));
        assert_eq!(Some(&7u32), writer.user_info().unwrap().downcast_ref());
        let mut plain: Vec<u8> = Vec::new();
        assert!(Writer::new(&mut plain).user_info().is_none());
    }
}
