#![forbid(unsafe_code)]

mod annotation;
mod classfile;
mod constant_pool;
mod descriptor;
mod error;
mod reader;

pub use crate::annotation::{Annotation, ConstValue, ElementValue};
pub use crate::classfile::{ClassFile, ClassMember, InnerClassInfo};
pub use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
pub use crate::descriptor::{BaseType, FieldType, MethodDescriptor, ReturnType};
pub use crate::error::{Error, Result};

/// Magic number every class file starts with.
pub const CLASS_MAGIC: u32 = 0xCAFEBABE;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_STATIC: u16 = 0x0008;
