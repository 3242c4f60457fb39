use crate::constant_pool::{ConstantPool, CpInfo};
use crate::error::{Error, Result};
use crate::reader::Reader;

const ATTRIBUTE: &str = "RuntimeAnnotations";

/// Deepest chain of nested annotations and arrays accepted in one element.
const MAX_NESTING: usize = 255;

/// One annotation as stored in a `Runtime{Visible,Invisible}Annotations`
/// attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub type_descriptor: String,
    pub elements: Vec<(String, ElementValue)>,
}

impl Annotation {
    pub(crate) fn parse(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<Self> {
        Self::parse_nested(reader, cp, 0)
    }

    fn parse_nested(reader: &mut Reader<'_>, cp: &ConstantPool, depth: usize) -> Result<Self> {
        let type_descriptor = cp.get_utf8(reader.read_u2()?)?.to_string();

        let pairs = reader.read_u2()? as usize;
        let mut elements = Vec::with_capacity(pairs);
        for _ in 0..pairs {
            let name = cp.get_utf8(reader.read_u2()?)?.to_string();
            elements.push((name, ElementValue::parse(reader, cp, depth)?));
        }

        Ok(Self {
            type_descriptor,
            elements,
        })
    }

    /// Internal name of the annotation type (`Ljava/lang/Deprecated;` ->
    /// `java/lang/Deprecated`).
    pub fn type_internal_name(&self) -> Option<&str> {
        self.type_descriptor
            .strip_prefix('L')
            .and_then(|rest| rest.strip_suffix(';'))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Const(ConstValue),
    Enum {
        type_descriptor: String,
        const_name: String,
    },
    Class(String),
    Annotation(Box<Annotation>),
    Array(Vec<ElementValue>),
}

impl ElementValue {
    fn parse(reader: &mut Reader<'_>, cp: &ConstantPool, depth: usize) -> Result<Self> {
        if depth > MAX_NESTING {
            return Err(Error::MalformedAttribute(ATTRIBUTE));
        }
        let tag = reader.read_u1()?;
        let value = match tag {
            b'B' | b'C' | b'I' | b'S' | b'Z' | b'D' | b'F' | b'J' | b's' => {
                let index = reader.read_u2()?;
                ElementValue::Const(ConstValue::from_pool(tag, index, cp, ATTRIBUTE)?)
            }
            b'e' => ElementValue::Enum {
                type_descriptor: cp.get_utf8(reader.read_u2()?)?.to_string(),
                const_name: cp.get_utf8(reader.read_u2()?)?.to_string(),
            },
            b'c' => ElementValue::Class(cp.get_utf8(reader.read_u2()?)?.to_string()),
            b'@' => {
                let nested = Annotation::parse_nested(reader, cp, depth + 1)?;
                ElementValue::Annotation(Box::new(nested))
            }
            b'[' => {
                let count = reader.read_u2()? as usize;
                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    values.push(ElementValue::parse(reader, cp, depth + 1)?);
                }
                ElementValue::Array(values)
            }
            _ => return Err(Error::MalformedAttribute(ATTRIBUTE)),
        };
        Ok(value)
    }
}

/// A compile-time constant, either an annotation element or a field's
/// `ConstantValue`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Byte(i8),
    /// A UTF-16 code unit, which may be half of a surrogate pair.
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(String),
}

impl ConstValue {
    /// Resolves a constant pool entry according to a descriptor-style tag.
    /// `attribute` names the attribute being parsed, for error reporting.
    pub(crate) fn from_pool(
        tag: u8,
        index: u16,
        cp: &ConstantPool,
        attribute: &'static str,
    ) -> Result<Self> {
        let info = cp.get(index)?;
        let mismatch = |expected: &'static str| Error::ConstantPoolTypeMismatch {
            index,
            expected,
            found: info.kind(),
        };

        let value = match (tag, info) {
            (b'B', CpInfo::Integer(v)) => ConstValue::Byte(*v as i8),
            (b'C', CpInfo::Integer(v)) => ConstValue::Char(*v as u16),
            (b'I', CpInfo::Integer(v)) => ConstValue::Int(*v),
            (b'S', CpInfo::Integer(v)) => ConstValue::Short(*v as i16),
            (b'Z', CpInfo::Integer(v)) => ConstValue::Boolean(*v != 0),
            (b'B' | b'C' | b'I' | b'S' | b'Z', _) => return Err(mismatch("Integer")),
            (b'J', CpInfo::Long(v)) => ConstValue::Long(*v),
            (b'J', _) => return Err(mismatch("Long")),
            (b'F', CpInfo::Float(v)) => ConstValue::Float(*v),
            (b'F', _) => return Err(mismatch("Float")),
            (b'D', CpInfo::Double(v)) => ConstValue::Double(*v),
            (b'D', _) => return Err(mismatch("Double")),
            (b's', _) => ConstValue::String(cp.get_string_constant(index)?),
            _ => return Err(Error::MalformedAttribute(attribute)),
        };
        Ok(value)
    }

    /// The value as a Rust `char`, when it is one. A lone surrogate is not.
    #[must_use]
    pub fn as_char(&self) -> Option<char> {
        match self {
            ConstValue::Char(unit) => char::from_u32(u32::from(*unit)),
            _ => None,
        }
    }
}
