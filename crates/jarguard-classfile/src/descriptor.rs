use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            b'B' => BaseType::Byte,
            b'C' => BaseType::Char,
            b'D' => BaseType::Double,
            b'F' => BaseType::Float,
            b'I' => BaseType::Int,
            b'J' => BaseType::Long,
            b'S' => BaseType::Short,
            b'Z' => BaseType::Boolean,
            _ => return None,
        })
    }

    /// Descriptor tag (`I`, `J`, ...).
    pub fn tag(self) -> u8 {
        match self {
            BaseType::Byte => b'B',
            BaseType::Char => b'C',
            BaseType::Double => b'D',
            BaseType::Float => b'F',
            BaseType::Int => b'I',
            BaseType::Long => b'J',
            BaseType::Short => b'S',
            BaseType::Boolean => b'Z',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Base(BaseType),
    Object(String),
    Array(Box<FieldType>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Type(FieldType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<FieldType>,
    pub return_type: ReturnType,
}

pub fn parse_field_descriptor(desc: &str) -> Result<FieldType> {
    match split_field_type(desc.as_bytes()) {
        Some((ty, [])) => Ok(ty),
        _ => Err(Error::InvalidDescriptor(desc.to_string())),
    }
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor> {
    let invalid = || Error::InvalidDescriptor(desc.to_string());

    let mut rest = desc.as_bytes().strip_prefix(b"(").ok_or_else(invalid)?;
    let mut params = Vec::new();
    loop {
        match rest.first() {
            Some(b')') => {
                rest = &rest[1..];
                break;
            }
            Some(_) => {
                let (param, tail) = split_field_type(rest).ok_or_else(invalid)?;
                params.push(param);
                rest = tail;
            }
            None => return Err(invalid()),
        }
    }

    let return_type = match rest {
        b"V" => ReturnType::Void,
        _ => match split_field_type(rest) {
            Some((ty, [])) => ReturnType::Type(ty),
            _ => return Err(invalid()),
        },
    };

    Ok(MethodDescriptor {
        params,
        return_type,
    })
}

/// An array type may have at most this many dimensions.
const MAX_ARRAY_DIMENSIONS: usize = 255;

/// Parses one field type off the front of `input`, returning the remainder.
fn split_field_type(input: &[u8]) -> Option<(FieldType, &[u8])> {
    let dimensions = input.iter().take_while(|b| **b == b'[').count();
    if dimensions > MAX_ARRAY_DIMENSIONS {
        return None;
    }

    let (&tag, rest) = input[dimensions..].split_first()?;
    let (element, rest) = match tag {
        b'L' => {
            let end = rest.iter().position(|b| *b == b';')?;
            let name = std::str::from_utf8(&rest[..end]).ok()?;
            if name.is_empty() {
                return None;
            }
            (FieldType::Object(name.to_string()), &rest[end + 1..])
        }
        _ => (FieldType::Base(BaseType::from_tag(tag)?), rest),
    };

    let ty = (0..dimensions).fold(element, |ty, _| FieldType::Array(Box::new(ty)));
    Some((ty, rest))
}
