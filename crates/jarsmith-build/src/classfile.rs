//! Minimal JVM class-file reader used for entry-point discovery
//!
//! Only the parts needed to answer "which methods does this class declare"
//! are decoded: the constant pool, the class name and the method table.

use crate::error::{BuildError, BuildResult};
use std::path::Path;

const MAGIC: u32 = 0xCAFE_BABE;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_STATIC: u16 = 0x0008;

/// A method declared by a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub access_flags: u16,
    pub name: String,
    /// JVM descriptor, e.g. `([Ljava/lang/String;)V`
    pub descriptor: String,
}

impl MethodInfo {
    /// Parameter type descriptors, e.g. `["[Ljava/lang/String;"]`
    pub fn parameter_types(&self) -> Vec<&str> {
        let Some(params) = self
            .descriptor
            .strip_prefix('(')
            .and_then(|rest| rest.split_once(')'))
            .map(|(params, _)| params)
        else {
            return Vec::new();
        };

        let bytes = params.as_bytes();
        let mut types = Vec::new();
        let mut start = 0;
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'[' => {
                    i += 1;
                    continue;
                }
                b'L' => match params[i..].find(';') {
                    Some(end) => i += end + 1,
                    None => break,
                },
                _ => i += 1,
            }
            types.push(&params[start..i]);
            start = i;
        }
        types
    }

    pub fn is_static(&self) -> bool {
        self.access_flags & ACC_STATIC != 0
    }
}

/// Symbols of one compiled class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    /// Fully qualified, dot separated name
    pub name: String,
    pub access_flags: u16,
    pub methods: Vec<MethodInfo>,
}

impl ClassInfo {
    /// Name without the package
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Method with `name` taking exactly `params` (descriptors)
    pub fn method(&self, name: &str, params: &[&str]) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.parameter_types() == params)
    }
}

/// Turns class-file bytes into a symbol table
pub trait BytecodeIndexer {
    fn index(&self, path: &Path, bytes: &[u8]) -> BuildResult<ClassInfo>;
}

/// Indexer reading the class-file format directly
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassFileIndexer;

impl BytecodeIndexer for ClassFileIndexer {
    fn index(&self, path: &Path, bytes: &[u8]) -> BuildResult<ClassInfo> {
        parse_class(bytes).map_err(|reason| BuildError::class_format(path, reason))
    }
}

enum Constant {
    Utf8(String),
    Class(u16),
    Other,
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], String> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| format!("truncated at offset {}", self.pos))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, String> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, String> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, String> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn skip_attributes(&mut self) -> Result<(), String> {
        let count = self.u16()?;
        for _ in 0..count {
            self.u16()?;
            let len = self.u32()? as usize;
            self.take(len)?;
        }
        Ok(())
    }
}

fn parse_class(bytes: &[u8]) -> Result<ClassInfo, String> {
    let mut r = Reader { bytes, pos: 0 };
    if r.u32()? != MAGIC {
        return Err("bad magic number".to_string());
    }
    r.u16()?; // minor
    r.u16()?; // major

    let pool = read_constant_pool(&mut r)?;
    let utf8 = |idx: u16| match pool.get(idx as usize) {
        Some(Constant::Utf8(s)) => Ok(s.clone()),
        _ => Err(format!("constant #{} is not a UTF-8 entry", idx)),
    };

    let access_flags = r.u16()?;
    let this_class = r.u16()?;
    let name = match pool.get(this_class as usize) {
        Some(Constant::Class(name_idx)) => utf8(*name_idx)?.replace('/', "."),
        _ => return Err(format!("constant #{} is not a class entry", this_class)),
    };
    r.u16()?; // super class

    let interfaces = r.u16()? as usize;
    r.take(interfaces * 2)?;

    let fields = r.u16()?;
    for _ in 0..fields {
        r.take(6)?;
        r.skip_attributes()?;
    }

    let method_count = r.u16()?;
    let mut methods = Vec::with_capacity(method_count as usize);
    for _ in 0..method_count {
        let access_flags = r.u16()?;
        let name = utf8(r.u16()?)?;
        let descriptor = utf8(r.u16()?)?;
        r.skip_attributes()?;
        methods.push(MethodInfo {
            access_flags,
            name,
            descriptor,
        });
    }

    Ok(ClassInfo {
        name,
        access_flags,
        methods,
    })
}

fn read_constant_pool(r: &mut Reader<'_>) -> Result<Vec<Constant>, String> {
    let count = r.u16()? as usize;
    // index 0 is unused
    let mut pool = Vec::with_capacity(count);
    pool.push(Constant::Other);

    while pool.len() < count {
        let tag = r.u8()?;
        match tag {
            1 => {
                let len = r.u16()? as usize;
                let raw = r.take(len)?;
                pool.push(Constant::Utf8(String::from_utf8_lossy(raw).into_owned()));
            }
            7 => pool.push(Constant::Class(r.u16()?)),
            8 | 16 | 19 | 20 => {
                r.take(2)?;
                pool.push(Constant::Other);
            }
            15 => {
                r.take(3)?;
                pool.push(Constant::Other);
            }
            3 | 4 | 9 | 10 | 11 | 12 | 17 | 18 => {
                r.take(4)?;
                pool.push(Constant::Other);
            }
            5 | 6 => {
                // long and double occupy two slots
                r.take(8)?;
                pool.push(Constant::Other);
                pool.push(Constant::Other);
            }
            other => return Err(format!("unknown constant pool tag {}", other)),
        }
    }
    Ok(pool)
}
