use std::collections::HashMap;

const MAJOR_JAVA_8: u16 = 52;

struct Member {
    access_flags: u16,
    name: String,
    descriptor: String,
    /// Pool value of the `ConstantValue` attribute, as a `CONSTANT_Integer`.
    constant: Option<i32>,
}

/// Assembles minimal but well-formed class files.
pub struct ClassFileBuilder {
    internal_name: String,
    super_name: Option<String>,
    access_flags: u16,
    interfaces: Vec<String>,
    fields: Vec<Member>,
    methods: Vec<Member>,
}

impl ClassFileBuilder {
    pub fn new(internal_name: &str) -> Self {
        Self {
            internal_name: internal_name.to_string(),
            super_name: Some("java/lang/Object".to_string()),
            // public + super
            access_flags: 0x0021,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn access_flags(mut self, flags: u16) -> Self {
        self.access_flags = flags;
        self
    }

    pub fn super_class(mut self, internal_name: &str) -> Self {
        self.super_name = Some(internal_name.to_string());
        self
    }

    pub fn interface(mut self, internal_name: &str) -> Self {
        self.interfaces.push(internal_name.to_string());
        self
    }

    pub fn field(mut self, access_flags: u16, name: &str, descriptor: &str) -> Self {
        self.fields.push(Member {
            access_flags,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            constant: None,
        });
        self
    }

    /// A `static final int` field with a `ConstantValue` attribute.
    pub fn int_constant(mut self, name: &str, value: i32) -> Self {
        self.fields.push(Member {
            access_flags: 0x0019,
            name: name.to_string(),
            descriptor: "I".to_string(),
            constant: Some(value),
        });
        self
    }

    /// A `static final char` field holding one UTF-16 code unit.
    pub fn char_constant(mut self, name: &str, unit: u16) -> Self {
        self.fields.push(Member {
            access_flags: 0x0019,
            name: name.to_string(),
            descriptor: "C".to_string(),
            constant: Some(i32::from(unit)),
        });
        self
    }

    pub fn method(mut self, access_flags: u16, name: &str, descriptor: &str) -> Self {
        self.methods.push(Member {
            access_flags,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            constant: None,
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut pool = Pool::default();
        let this_class = pool.class(&self.internal_name);
        let super_class = self.super_name.as_deref().map(|s| pool.class(s)).unwrap_or(0);
        let interfaces: Vec<u16> = self.interfaces.iter().map(|i| pool.class(i)).collect();

        let mut body = Vec::new();
        push_u16(&mut body, self.access_flags);
        push_u16(&mut body, this_class);
        push_u16(&mut body, super_class);
        push_u16(&mut body, interfaces.len() as u16);
        for idx in interfaces {
            push_u16(&mut body, idx);
        }
        for members in [&self.fields, &self.methods] {
            push_u16(&mut body, members.len() as u16);
            for member in members {
                push_u16(&mut body, member.access_flags);
                push_u16(&mut body, pool.utf8(&member.name));
                push_u16(&mut body, pool.utf8(&member.descriptor));
                match member.constant {
                    Some(value) => {
                        push_u16(&mut body, 1);
                        push_u16(&mut body, pool.utf8("ConstantValue"));
                        push_u32(&mut body, 2);
                        push_u16(&mut body, pool.integer(value));
                    }
                    None => push_u16(&mut body, 0),
                }
            }
        }
        // class attributes
        push_u16(&mut body, 0);

        let mut bytes = Vec::new();
        push_u32(&mut bytes, 0xCAFEBABE);
        push_u16(&mut bytes, 0);
        push_u16(&mut bytes, MAJOR_JAVA_8);
        push_u16(&mut bytes, pool.count);
        bytes.extend_from_slice(&pool.bytes);
        bytes.extend_from_slice(&body);
        bytes
    }
}

struct Pool {
    bytes: Vec<u8>,
    count: u16,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
}

impl Default for Pool {
    fn default() -> Self {
        Self {
            bytes: Vec::new(),
            count: 1,
            utf8: HashMap::new(),
            classes: HashMap::new(),
        }
    }
}

impl Pool {
    fn next(&mut self) -> u16 {
        let idx = self.count;
        self.count += 1;
        idx
    }

    fn utf8(&mut self, value: &str) -> u16 {
        if let Some(idx) = self.utf8.get(value) {
            return *idx;
        }
        let idx = self.next();
        self.bytes.push(1); // CONSTANT_Utf8
        push_u16(&mut self.bytes, value.len() as u16);
        self.bytes.extend_from_slice(value.as_bytes());
        self.utf8.insert(value.to_string(), idx);
        idx
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        if let Some(idx) = self.classes.get(internal_name) {
            return *idx;
        }
        let name_index = self.utf8(internal_name);
        let idx = self.next();
        self.bytes.push(7); // CONSTANT_Class
        push_u16(&mut self.bytes, name_index);
        self.classes.insert(internal_name.to_string(), idx);
        idx
    }

    fn integer(&mut self, value: i32) -> u16 {
        let idx = self.next();
        self.bytes.push(3); // CONSTANT_Integer
        push_u32(&mut self.bytes, value as u32);
        idx
    }
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}
