//! Garbage collection infrastructure - base types.

use std::fmt;

/// Handle to a heap-allocated object.
///
/// A slot's generation advances every time its object is freed, so a handle
/// kept past a free never resolves to whatever reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    index: usize,
    generation: u32,
}

impl ObjectId {
    #[inline]
    pub const fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.index
    }

    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.generation)
    }
}

/// Kind tag carried by every heap object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ObjType {
    Bool = 0,
    BoundMethod = 1,
    Class = 2,
    Closure = 3,
    Function = 4,
    Instance = 5,
    Native = 6,
    Number = 7,
    String = 8,
    Upvalue = 9,
}

impl ObjType {
    pub const COUNT: usize = 10;

    pub const ALL: [ObjType; ObjType::COUNT] = [
        ObjType::Bool,
        ObjType::BoundMethod,
        ObjType::Class,
        ObjType::Closure,
        ObjType::Function,
        ObjType::Instance,
        ObjType::Native,
        ObjType::Number,
        ObjType::String,
        ObjType::Upvalue,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ObjType::Bool => "bool",
            ObjType::BoundMethod => "bound method",
            ObjType::Class => "class",
            ObjType::Closure => "closure",
            ObjType::Function => "function",
            ObjType::Instance => "instance",
            ObjType::Native => "native",
            ObjType::Number => "number",
            ObjType::String => "string",
            ObjType::Upvalue => "upvalue",
        }
    }
}

impl fmt::Display for ObjType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Header stored in front of every heap object.
///
/// `marked` belongs to the collector: constructors clear it and nothing in the
/// object model reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjHeader {
    pub kind: ObjType,
    pub marked: bool,
}

impl ObjHeader {
    pub fn new(kind: ObjType) -> Self {
        Self { kind, marked: false }
    }
}
