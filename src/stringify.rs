//! Serialization support for query strings.

use serde::ser;

use crate::config::Config;
use crate::error::{Error, Result};

/// Serializes `input` as a flat query string.
///
/// The top level must look like a mapping: a map or struct writes one
/// pair per entry, a sequence or tuple writes pairs under its index keys
/// (`0=..&1=..`), and anything else serializes to the empty string.
pub(crate) fn stringify<T: ser::Serialize>(config: &Config, input: &T) -> Result<String> {
    // initial guess, most query strings fit without growing
    let mut output = String::with_capacity(128);
    input.serialize(Stringifier {
        config,
        output: &mut output,
    })?;

    // every pair is written with a trailing separator; strip the last one
    if !config.separator.is_empty() && output.ends_with(config.separator.as_ref()) {
        output.truncate(output.len() - config.separator.len());
    }
    Ok(output)
}

/// Shared sink for key/value pairs.
///
/// Holds the encoded key of the pair currently being written; sequences
/// reuse it to write one pair per element.
struct Pairs<'s> {
    config: &'s Config,
    output: &'s mut String,
    key: Option<String>,
}

impl Pairs<'_> {
    fn set_key(&mut self, key: &str) -> Result<()> {
        self.key = Some((self.config.encode_fn)(key)?);
        Ok(())
    }

    fn write_key(&mut self) -> Result<()> {
        let Some(key) = self.key.as_deref() else {
            return Err(Error::Custom("internal error: no key found".to_string()));
        };
        self.output.push_str(key);
        Ok(())
    }

    fn write_value(&mut self, value: &str) -> Result<()> {
        let encoded = (self.config.encode_fn)(value)?;
        self.write_key()?;
        self.output.push_str(&self.config.key_value_joiner);
        self.output.push_str(&encoded);
        self.output.push_str(&self.config.separator);
        Ok(())
    }

    fn write_unit(&mut self) -> Result<()> {
        self.write_key()?;
        self.output.push_str(&self.config.key_value_joiner);
        self.output.push_str(&self.config.separator);
        Ok(())
    }

    fn write_no_value(&mut self) -> Result<()> {
        self.write_key()?;
        self.output.push_str(&self.config.separator);
        Ok(())
    }
}

/// Top-level serializer. Scalars are not mappings, so they serialize to
/// nothing at all; see [`stringify`].
struct Stringifier<'s> {
    config: &'s Config,
    output: &'s mut String,
}

impl<'s> Stringifier<'s> {
    fn into_pairs(self) -> Pairs<'s> {
        Pairs {
            config: self.config,
            output: self.output,
            key: None,
        }
    }
}

impl<'s> ser::Serializer for Stringifier<'s> {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = TopSeq<'s>;
    type SerializeTuple = TopSeq<'s>;
    type SerializeTupleStruct = TopSeq<'s>;
    type SerializeTupleVariant = ser::Impossible<Self::Ok, Error>;
    type SerializeMap = Pairs<'s>;
    type SerializeStruct = Pairs<'s>;
    type SerializeStructVariant = ser::Impossible<Self::Ok, Error>;

    fn serialize_bool(self, _v: bool) -> Result<Self::Ok> {
        Ok(())
    }

    fn serialize_i8(self, _v: i8) -> Result<Self::Ok> {
        Ok(())
    }

    fn serialize_i16(self, _v: i16) -> Result<Self::Ok> {
        Ok(())
    }

    fn serialize_i32(self, _v: i32) -> Result<Self::Ok> {
        Ok(())
    }

    fn serialize_i64(self, _v: i64) -> Result<Self::Ok> {
        Ok(())
    }

    fn serialize_u8(self, _v: u8) -> Result<Self::Ok> {
        Ok(())
    }

    fn serialize_u16(self, _v: u16) -> Result<Self::Ok> {
        Ok(())
    }

    fn serialize_u32(self, _v: u32) -> Result<Self::Ok> {
        Ok(())
    }

    fn serialize_u64(self, _v: u64) -> Result<Self::Ok> {
        Ok(())
    }

    fn serialize_f32(self, _v: f32) -> Result<Self::Ok> {
        Ok(())
    }

    fn serialize_f64(self, _v: f64) -> Result<Self::Ok> {
        Ok(())
    }

    fn serialize_char(self, _v: char) -> Result<Self::Ok> {
        Ok(())
    }

    fn serialize_str(self, _v: &str) -> Result<Self::Ok> {
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Self::Ok> {
        Ok(())
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        Ok(())
    }

    fn serialize_some<T: ?Sized + ser::Serialize>(self, value: &T) -> Result<Self::Ok> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Self::Ok> {
        Ok(())
    }

    fn serialize_newtype_struct<T: ?Sized + ser::Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + ser::Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok> {
        Err(Error::Unsupported)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(TopSeq::new(self.into_pairs()))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Ok(TopSeq::new(self.into_pairs()))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Ok(TopSeq::new(self.into_pairs()))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::Unsupported)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(self.into_pairs())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(self.into_pairs())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::Unsupported)
    }
}

impl ser::SerializeMap for Pairs<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        key.serialize(KeySerializer { pairs: self })
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        value.serialize(ValueSerializer {
            pairs: self,
            nested: false,
        })
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}

impl ser::SerializeStruct for Pairs<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.set_key(key)?;
        value.serialize(ValueSerializer {
            pairs: self,
            nested: false,
        })
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}

/// Top-level sequence support. For-in iteration over an array yields its
/// indices, so elements are written under the keys `0`, `1`, ...
struct TopSeq<'s> {
    pairs: Pairs<'s>,
    counter: usize,
}

impl<'s> TopSeq<'s> {
    fn new(pairs: Pairs<'s>) -> Self {
        Self { pairs, counter: 0 }
    }

    fn element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        let mut buffer = itoa::Buffer::new();
        self.pairs.set_key(buffer.format(self.counter))?;
        self.counter += 1;
        value.serialize(ValueSerializer {
            pairs: &mut self.pairs,
            nested: false,
        })
    }
}

impl ser::SerializeSeq for TopSeq<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.element(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}

impl ser::SerializeTuple for TopSeq<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.element(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for TopSeq<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.element(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}

macro_rules! serialize_itoa {
    ($($ty:ty => $meth:ident,)*) => {
        $(
            fn $meth(self, v: $ty) -> Result<Self::Ok> {
                let mut buffer = itoa::Buffer::new();
                self.pairs.write_value(buffer.format(v))?;
                Ok(())
            }
        )*
    };
}

macro_rules! serialize_ryu {
    ($($ty:ty => $meth:ident,)*) => {
        $(
            fn $meth(self, v: $ty) -> Result<Self::Ok> {
                let mut buffer = ryu::Buffer::new();
                self.pairs.write_value(buffer.format(v))?;
                Ok(())
            }
        )*
    };
}

/// Serializer for a single value position.
///
/// Scalars write one pair under the current key. A sequence writes one
/// pair per element under the same key, which is why `nested` exists:
/// sequence elements must themselves be scalars.
struct ValueSerializer<'a, 's> {
    pairs: &'a mut Pairs<'s>,
    nested: bool,
}

impl<'a, 's> ser::Serializer for ValueSerializer<'a, 's> {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = ValueSeq<'a, 's>;
    type SerializeTuple = ValueSeq<'a, 's>;
    type SerializeTupleStruct = ValueSeq<'a, 's>;
    type SerializeTupleVariant = ser::Impossible<Self::Ok, Error>;
    type SerializeMap = ser::Impossible<Self::Ok, Error>;
    type SerializeStruct = ser::Impossible<Self::Ok, Error>;
    type SerializeStructVariant = ser::Impossible<Self::Ok, Error>;

    serialize_itoa! {
        u8  => serialize_u8,
        u16 => serialize_u16,
        u32 => serialize_u32,
        u64 => serialize_u64,
        i8  => serialize_i8,
        i16 => serialize_i16,
        i32 => serialize_i32,
        i64 => serialize_i64,
    }
    serialize_ryu! {
        f32 => serialize_f32,
        f64 => serialize_f64,
    }

    fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
        self.pairs.write_value(if v { "true" } else { "false" })
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        let mut b = [0; 4];
        self.pairs.write_value(v.encode_utf8(&mut b))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        self.pairs.write_value(v)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Self::Ok> {
        Err(Error::Unsupported)
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        self.pairs.write_no_value()
    }

    fn serialize_some<T: ?Sized + ser::Serialize>(self, value: &T) -> Result<Self::Ok> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        self.pairs.write_unit()
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok> {
        self.pairs.write_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok> {
        self.pairs.write_value(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + ser::Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + ser::Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok> {
        Err(Error::Unsupported)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        if self.nested {
            return Err(Error::Unsupported);
        }
        Ok(ValueSeq { pairs: self.pairs })
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        if self.nested {
            return Err(Error::Unsupported);
        }
        Ok(ValueSeq { pairs: self.pairs })
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        if self.nested {
            return Err(Error::Unsupported);
        }
        Ok(ValueSeq { pairs: self.pairs })
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::Unsupported)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Error::Unsupported)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(Error::Unsupported)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::Unsupported)
    }
}

/// A sequence in value position writes one pair per element under the
/// key already stored in the sink. An empty sequence writes nothing, so
/// its key does not appear in the output at all.
struct ValueSeq<'a, 's> {
    pairs: &'a mut Pairs<'s>,
}

impl ValueSeq<'_, '_> {
    fn element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        value.serialize(ValueSerializer {
            pairs: &mut *self.pairs,
            nested: true,
        })
    }
}

impl ser::SerializeSeq for ValueSeq<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.element(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}

impl ser::SerializeTuple for ValueSeq<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.element(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for ValueSeq<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.element(value)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}

macro_rules! serialize_key_itoa {
    ($($ty:ty => $meth:ident,)*) => {
        $(
            fn $meth(self, v: $ty) -> Result<Self::Ok> {
                let mut buffer = itoa::Buffer::new();
                self.pairs.set_key(buffer.format(v))?;
                Ok(())
            }
        )*
    };
}

macro_rules! serialize_key_ryu {
    ($($ty:ty => $meth:ident,)*) => {
        $(
            fn $meth(self, v: $ty) -> Result<Self::Ok> {
                let mut buffer = ryu::Buffer::new();
                self.pairs.set_key(buffer.format(v))?;
                Ok(())
            }
        )*
    };
}

/// Serializer for a map key. Only scalar keys make sense in a query
/// string; compound keys are rejected.
struct KeySerializer<'a, 's> {
    pairs: &'a mut Pairs<'s>,
}

impl ser::Serializer for KeySerializer<'_, '_> {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = ser::Impossible<Self::Ok, Error>;
    type SerializeTuple = ser::Impossible<Self::Ok, Error>;
    type SerializeTupleStruct = ser::Impossible<Self::Ok, Error>;
    type SerializeTupleVariant = ser::Impossible<Self::Ok, Error>;
    type SerializeMap = ser::Impossible<Self::Ok, Error>;
    type SerializeStruct = ser::Impossible<Self::Ok, Error>;
    type SerializeStructVariant = ser::Impossible<Self::Ok, Error>;

    serialize_key_itoa! {
        u8  => serialize_u8,
        u16 => serialize_u16,
        u32 => serialize_u32,
        u64 => serialize_u64,
        i8  => serialize_i8,
        i16 => serialize_i16,
        i32 => serialize_i32,
        i64 => serialize_i64,
    }
    serialize_key_ryu! {
        f32 => serialize_f32,
        f64 => serialize_f64,
    }

    fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
        self.pairs.set_key(if v { "true" } else { "false" })
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        let mut b = [0; 4];
        self.pairs.set_key(v.encode_utf8(&mut b))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        self.pairs.set_key(v)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Self::Ok> {
        Err(Error::Unsupported)
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        Err(Error::Unsupported)
    }

    fn serialize_some<T: ?Sized + ser::Serialize>(self, _value: &T) -> Result<Self::Ok> {
        Err(Error::Unsupported)
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        Err(Error::Unsupported)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok> {
        Err(Error::Unsupported)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok> {
        self.pairs.set_key(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + ser::Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + ser::Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok> {
        Err(Error::Unsupported)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(Error::Unsupported)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(Error::Unsupported)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(Error::Unsupported)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::Unsupported)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Error::Unsupported)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(Error::Unsupported)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::Unsupported)
    }
}
