//! Method-body assembly.
//!
//! [`MethodBuilder`] collects modifiers, a return type, parameters and body
//! statements, then freezes them into a [`MethodSpec`]. Specs render as
//! pseudo-source through `Display`; the listing is what trace logs and
//! diagnostics show.

use std::fmt;

use flat_ir::FieldType;
use smallvec::SmallVec;

/// What a synthesized method implements.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// A contract method bound to fields by accessor directives.
    Accessor,
    /// Structural equality.
    Equals,
    /// Structural hash.
    HashCode,
    /// Textual dump.
    Dump,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct MethodModifiers: u8 {
        const PUBLIC = 1;
    }
}

/// A parameter or return type in a method signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Field(FieldType),
    /// Any instance; the `other` operand of `equals`.
    Instance,
    Bool,
    /// 32-bit hash.
    Int,
    Text,
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Field(ty) => write!(f, "{ty}"),
            TypeRef::Instance => f.write_str("any"),
            TypeRef::Bool => f.write_str("bool"),
            TypeRef::Int => f.write_str("int"),
            TypeRef::Text => f.write_str("text"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamSpec {
    pub name: String,
    pub ty: TypeRef,
}

/// How a field's value takes part in equality, hashing and dumping.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueRule {
    /// By value.
    Primitive,
    /// Null-safe, delegated to the referenced value.
    Reference,
}

impl ValueRule {
    pub fn for_type(ty: &FieldType) -> ValueRule {
        if ty.is_primitive() {
            ValueRule::Primitive
        } else {
            ValueRule::Reference
        }
    }
}

/// One statement of a synthesized body.
///
/// Fields are referenced by name; the emitter resolves them against the
/// storage spec of the type being linked.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stmt {
    /// `this.field = param`.
    Store { field: String, param: usize, locked: bool },
    /// `return this.field`.
    Return { field: String, locked: bool },
    /// `if (this == other) return true`.
    SameInstance,
    /// `if (type(other) != type(this)) return false`.
    SameType,
    /// `if (this.field != other.field) return false`.
    Compare { field: String, rule: ValueRule },
    ReturnBool(bool),
    /// `int result = seed`.
    HashSeed(i32),
    /// `result = 31 * result + hash(this.field)`.
    HashMix { field: String, rule: ValueRule },
    ReturnHash,
    /// Start the dump with `"<header> [\n"`.
    DumpOpen { header: String },
    /// Append `"    field=value\n"`.
    DumpField { field: String, rule: ValueRule },
    /// Append `"]"` and return.
    DumpClose,
}

impl Stmt {
    /// The field this statement touches, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Stmt::Store { field, .. }
            | Stmt::Return { field, .. }
            | Stmt::Compare { field, .. }
            | Stmt::HashMix { field, .. }
            | Stmt::DumpField { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// A fully assembled method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodSpec {
    pub name: String,
    pub kind: MethodKind,
    pub modifiers: MethodModifiers,
    /// `None` for `void`.
    pub returns: Option<TypeRef>,
    pub params: SmallVec<[ParamSpec; 2]>,
    pub body: Vec<Stmt>,
}

impl MethodSpec {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Names of every field the body touches, in statement order.
    pub fn field_refs(&self) -> impl Iterator<Item = &str> {
        self.body.iter().filter_map(Stmt::field)
    }
}

/// Collects the parts of a method before freezing them into a [`MethodSpec`].
#[derive(Debug)]
pub struct MethodBuilder {
    name: String,
    kind: MethodKind,
    modifiers: MethodModifiers,
    returns: Option<TypeRef>,
    params: SmallVec<[ParamSpec; 2]>,
    body: Vec<Stmt>,
}

impl MethodBuilder {
    pub fn new(name: impl Into<String>, kind: MethodKind) -> Self {
        MethodBuilder {
            name: name.into(),
            kind,
            modifiers: MethodModifiers::empty(),
            returns: None,
            params: SmallVec::new(),
            body: Vec::new(),
        }
    }

    pub fn add_modifier(&mut self, modifier: MethodModifiers) {
        self.modifiers |= modifier;
    }

    pub fn set_return_type(&mut self, ty: TypeRef) {
        self.returns = Some(ty);
    }

    /// Append a parameter and return its position.
    pub fn add_param(&mut self, name: impl Into<String>, ty: TypeRef) -> usize {
        self.params.push(ParamSpec {
            name: name.into(),
            ty,
        });
        self.params.len() - 1
    }

    pub fn add_stmt(&mut self, stmt: Stmt) {
        self.body.push(stmt);
    }

    pub fn build(self) -> MethodSpec {
        MethodSpec {
            name: self.name,
            kind: self.kind,
            modifiers: self.modifiers,
            returns: self.returns,
            params: self.params,
            body: self.body,
        }
    }
}

impl fmt::Display for MethodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(MethodModifiers::PUBLIC) {
            f.write_str("public ")?;
        }
        match &self.returns {
            Some(ty) => write!(f, "{ty} ")?,
            None => f.write_str("void ")?,
        }
        write!(f, "{}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", p.ty, p.name)?;
        }
        f.write_str(") {\n")?;
        for stmt in &self.body {
            f.write_str("    ")?;
            self.fmt_stmt(stmt, f)?;
            f.write_str("\n")?;
        }
        f.write_str("}")
    }
}

impl MethodSpec {
    fn param_name(&self, index: usize) -> &str {
        self.params.get(index).map_or("?", |p| p.name.as_str())
    }

    fn fmt_stmt(&self, stmt: &Stmt, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match stmt {
            Stmt::Store {
                field,
                param,
                locked,
            } => {
                let param = self.param_name(*param);
                if *locked {
                    write!(f, "synchronized ({field}) {{ this.{field} = {param}; }}")
                } else {
                    write!(f, "this.{field} = {param};")
                }
            }
            Stmt::Return { field, locked } => {
                if *locked {
                    write!(f, "synchronized ({field}) {{ return this.{field}; }}")
                } else {
                    write!(f, "return this.{field};")
                }
            }
            Stmt::SameInstance => f.write_str("if (this == other) return true;"),
            Stmt::SameType => f.write_str("if (type(other) != type(this)) return false;"),
            Stmt::Compare {
                field,
                rule: ValueRule::Primitive,
            } => write!(f, "if (this.{field} != other.{field}) return false;"),
            Stmt::Compare {
                field,
                rule: ValueRule::Reference,
            } => write!(f, "if (!eq(this.{field}, other.{field})) return false;"),
            Stmt::ReturnBool(value) => write!(f, "return {value};"),
            Stmt::HashSeed(seed) => write!(f, "int result = {seed};"),
            Stmt::HashMix {
                field,
                rule: ValueRule::Primitive,
            } => write!(f, "result = 31 * result + (int) this.{field};"),
            Stmt::HashMix {
                field,
                rule: ValueRule::Reference,
            } => write!(f, "result = 31 * result + hash(this.{field});"),
            Stmt::ReturnHash => f.write_str("return result;"),
            Stmt::DumpOpen { header } => write!(f, "text out = \"{header} [\\n\";"),
            Stmt::DumpField {
                field,
                rule: ValueRule::Primitive,
            } => write!(f, "out += \"    {field}=\" + this.{field} + \"\\n\";"),
            Stmt::DumpField {
                field,
                rule: ValueRule::Reference,
            } => write!(f, "out += \"    {field}=\" + ident(this.{field}) + \"\\n\";"),
            Stmt::DumpClose => f.write_str("return out + \"]\";"),
        }
    }
}

#[cfg(test)]
mod tests;
