use crate::annotation::{Annotation, ConstValue};
use crate::constant_pool::ConstantPool;
use crate::descriptor::{parse_field_descriptor, parse_method_descriptor, FieldType};
use crate::error::{Error, Result};
use crate::reader::Reader;
use crate::CLASS_MAGIC;

#[derive(Debug, Clone)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub access_flags: u16,
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<ClassMember>,
    pub methods: Vec<ClassMember>,
    pub signature: Option<String>,
    pub annotations: Vec<Annotation>,
    pub inner_classes: Vec<InnerClassInfo>,
}

#[derive(Debug, Clone)]
pub struct ClassMember {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    /// `ConstantValue` of a field; always `None` for methods.
    pub constant_value: Option<ConstValue>,
    /// Checked exceptions of a method; always empty for fields.
    pub exceptions: Vec<String>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassInfo {
    pub inner_class: String,
    pub outer_class: Option<String>,
    pub inner_name: Option<String>,
    pub access_flags: u16,
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let magic = reader.read_u4()?;
        if magic != CLASS_MAGIC {
            return Err(Error::InvalidMagic(magic));
        }

        let minor_version = reader.read_u2()?;
        let major_version = reader.read_u2()?;
        let cp = ConstantPool::parse(&mut reader)?;

        let access_flags = reader.read_u2()?;
        let this_class = cp.get_class_name(reader.read_u2()?)?;
        let super_class = match reader.read_u2()? {
            0 => None,
            idx => Some(cp.get_class_name(idx)?),
        };

        let interfaces_count = reader.read_u2()? as usize;
        let mut interfaces = Vec::with_capacity(interfaces_count);
        for _ in 0..interfaces_count {
            interfaces.push(cp.get_class_name(reader.read_u2()?)?);
        }

        let fields_count = reader.read_u2()? as usize;
        let mut fields = Vec::with_capacity(fields_count);
        for _ in 0..fields_count {
            fields.push(parse_member(&mut reader, &cp, AttributeTarget::Field)?);
        }

        let methods_count = reader.read_u2()? as usize;
        let mut methods = Vec::with_capacity(methods_count);
        for _ in 0..methods_count {
            methods.push(parse_member(&mut reader, &cp, AttributeTarget::Method)?);
        }

        let attrs = parse_attributes(&mut reader, &cp, &AttributeTarget::Class)?;
        reader.ensure_empty()?;

        Ok(Self {
            minor_version,
            major_version,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            signature: attrs.signature,
            annotations: attrs.annotations,
            inner_classes: attrs.inner_classes,
        })
    }

    /// Dotted binary name (`com.example.Foo$Inner`).
    pub fn binary_name(&self) -> String {
        self.this_class.replace('/', ".")
    }

    pub fn field(&self, name: &str) -> Option<&ClassMember> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, name: &str, descriptor: &str) -> Option<&ClassMember> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.descriptor == descriptor)
    }
}

enum AttributeTarget {
    Class,
    /// Fields carry their parsed descriptor so `ConstantValue` can be typed.
    FieldOf(FieldType),
    Field,
    Method,
}

fn parse_member(
    reader: &mut Reader<'_>,
    cp: &ConstantPool,
    target: AttributeTarget,
) -> Result<ClassMember> {
    let access_flags = reader.read_u2()?;
    let name = cp.get_utf8(reader.read_u2()?)?.to_string();
    let descriptor = cp.get_utf8(reader.read_u2()?)?.to_string();

    let target = match target {
        AttributeTarget::Field => AttributeTarget::FieldOf(parse_field_descriptor(&descriptor)?),
        AttributeTarget::Method => {
            parse_method_descriptor(&descriptor)?;
            AttributeTarget::Method
        }
        other => other,
    };

    let attrs = parse_attributes(reader, cp, &target)?;
    Ok(ClassMember {
        access_flags,
        name,
        descriptor,
        signature: attrs.signature,
        constant_value: attrs.constant_value,
        exceptions: attrs.exceptions,
        annotations: attrs.annotations,
    })
}

#[derive(Default)]
struct ParsedAttributes {
    signature: Option<String>,
    constant_value: Option<ConstValue>,
    exceptions: Vec<String>,
    annotations: Vec<Annotation>,
    inner_classes: Vec<InnerClassInfo>,
}

fn parse_attributes(
    reader: &mut Reader<'_>,
    cp: &ConstantPool,
    target: &AttributeTarget,
) -> Result<ParsedAttributes> {
    let attributes_count = reader.read_u2()? as usize;
    let mut parsed = ParsedAttributes::default();
    for _ in 0..attributes_count {
        let name_index = reader.read_u2()?;
        let length = reader.read_u4()? as usize;
        let info = reader.read_bytes(length)?;
        let name = cp.get_utf8(name_index)?;

        let mut sub = Reader::new(info);
        match (name, target) {
            ("Signature", _) => {
                parsed.signature = Some(cp.get_utf8(sub.read_u2()?)?.to_string());
            }
            ("RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations", _) => {
                let num = sub.read_u2()? as usize;
                for _ in 0..num {
                    parsed.annotations.push(Annotation::parse(&mut sub, cp)?);
                }
            }
            ("ConstantValue", AttributeTarget::FieldOf(ty)) => {
                let tag = match ty {
                    FieldType::Base(base) => base.tag(),
                    FieldType::Object(class) if class == "java/lang/String" => b's',
                    _ => return Err(Error::MalformedAttribute("ConstantValue")),
                };
                parsed.constant_value = Some(ConstValue::from_pool(
                    tag,
                    sub.read_u2()?,
                    cp,
                    "ConstantValue",
                )?);
            }
            ("Exceptions", AttributeTarget::Method) => {
                let num = sub.read_u2()? as usize;
                for _ in 0..num {
                    parsed.exceptions.push(cp.get_class_name(sub.read_u2()?)?);
                }
            }
            ("InnerClasses", AttributeTarget::Class) => {
                let num = sub.read_u2()? as usize;
                for _ in 0..num {
                    parsed.inner_classes.push(parse_inner_class(&mut sub, cp)?);
                }
            }
            _ => {
                // Code, LineNumberTable, etc. don't describe the class surface.
                continue;
            }
        }
        sub.ensure_empty()?;
    }

    Ok(parsed)
}

fn parse_inner_class(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<InnerClassInfo> {
    let inner_class = cp.get_class_name(reader.read_u2()?)?;
    let outer_class = match reader.read_u2()? {
        0 => None,
        idx => Some(cp.get_class_name(idx)?),
    };
    let inner_name = match reader.read_u2()? {
        0 => None,
        idx => Some(cp.get_utf8(idx)?.to_string()),
    };
    let access_flags = reader.read_u2()?;
    Ok(InnerClassInfo {
        inner_class,
        outer_class,
        inner_name,
        access_flags,
    })
}
