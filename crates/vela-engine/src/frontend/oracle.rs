//! Symbol/type oracle consumed by the lowering core.
//!
//! The lowering pass never re-derives type information: every query it needs
//! ("is this an array type", "what is this call's declared tuple arity",
//! "is this binding exported and mutable") is answered by the front end
//! through the narrow [`TypeOracle`] interface defined here. Keeping the
//! interface this small lets the core be tested against a hand-built
//! [`SimpleOracle`] instead of a full type checker.

use rustc_hash::{FxHashMap, FxHashSet};

/// Opaque handle for a resolved type, assigned by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(u32);

impl TypeId {
    /// The number type
    pub const NUMBER: TypeId = TypeId(0);
    /// The string type
    pub const STRING: TypeId = TypeId(1);
    /// The boolean type
    pub const BOOLEAN: TypeId = TypeId(2);
    /// The null type
    pub const NIL: TypeId = TypeId(3);
    /// The void type (no value; also marks an explicitly absent receiver)
    pub const VOID: TypeId = TypeId(4);
    /// Unknown/any (lowering treats it as a plain dynamic value)
    pub const UNKNOWN: TypeId = TypeId(5);

    /// First id available for front-end-assigned types
    pub const FIRST_USER: u32 = 16;

    /// Create a type id from a raw index
    pub const fn new(raw: u32) -> Self {
        TypeId(raw)
    }

    /// Raw index
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// Opaque handle for a resolved binding (a declared name), assigned by the
/// front end's binder. Distinct from interned name symbols: two bindings in
/// different scopes may share a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u32);

impl BindingId {
    /// Create a binding id from a raw index
    pub const fn new(raw: u32) -> Self {
        BindingId(raw)
    }

    /// Raw index
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// Coarse classification of a resolved type, as far as lowering cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Numeric type (drives 1-based index adjustment)
    Number,
    /// String type (has the `length` capability member)
    String,
    /// Boolean type
    Boolean,
    /// Null type
    Nil,
    /// Void (no value)
    Void,
    /// Sequential container, 1-based in the target
    Array,
    /// Fixed- or dynamic-arity multi-value type
    Tuple,
    /// Function value (indexing into it is an error)
    Function,
    /// Class instance type
    Class,
    /// Enumeration type
    Enum,
    /// Anything else
    Unknown,
}

/// Declared multi-value return arity of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TupleArity {
    /// Exactly `n` values
    Fixed(u8),
    /// Statically unknown count
    Dynamic,
}

/// A property name with compiled meaning rather than a real field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityMember {
    /// Virtual `length` on strings and arrays; lowers to the `#` operator
    Length,
    /// A macro member this lowering stage has no translation for
    Unsupported,
}

/// Compile-time constant value of a const-enum member.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumValue {
    /// Integer member
    Int(i64),
    /// String member
    Str(String),
}

/// Read-only queries against the front end's symbol and type tables.
///
/// All methods are pure: calling them never mutates front-end state and the
/// same question always gets the same answer within one compilation.
pub trait TypeOracle {
    /// Classify a resolved type
    fn kind(&self, ty: TypeId) -> TypeKind;

    /// Declared tuple arity of a tuple type (`None` for non-tuples)
    fn tuple_arity(&self, ty: TypeId) -> Option<TupleArity>;

    /// Whether `ty` is assignable to an iterator-of-T capability
    /// (the legality check for generator return types)
    fn satisfies_iterator(&self, ty: TypeId) -> bool;

    /// Capability-macro member lookup on a type, if `name` is one
    fn capability_member(&self, ty: TypeId, name: &str) -> Option<CapabilityMember>;

    /// Whether a binding is an exported mutable declaration. Such bindings
    /// are re-read through their qualified export path at every use.
    fn is_exported_mutable(&self, binding: BindingId) -> bool;

    /// Whether a binding names a class
    fn is_class_symbol(&self, binding: BindingId) -> bool;

    /// Whether a binding names a constant enumeration
    fn is_const_enum(&self, binding: BindingId) -> bool;

    /// Constant value of a const-enum member
    fn enum_member_value(&self, binding: BindingId, member: &str) -> Option<EnumValue>;

    /// Whether a declaration is referenced lexically before its position in
    /// the same block (forces hoisting)
    fn referenced_before_declaration(&self, binding: BindingId) -> bool;

    /// How many times a named function expression references its own name
    /// from inside its body (decides whether it needs a local binding)
    fn self_reference_count(&self, binding: BindingId) -> usize;

    /// Whether an instance method of `ty` binds a receiver. Methods whose
    /// receiver parameter is explicitly declared absent (`this: void`) are
    /// called without one.
    fn method_binds_receiver(&self, ty: TypeId, name: &str) -> bool {
        let _ = (ty, name);
        true
    }

    /// Whether a declared name collides with the compiler's reserved
    /// namespace in emitted code
    fn is_reserved_name(&self, name: &str) -> bool {
        name.starts_with("____") || name.starts_with("__vela")
    }
}

/// Table-backed oracle for tests and embedders without a full front end.
///
/// Starts out knowing the built-in primitive types; everything else is
/// registered explicitly.
#[derive(Default)]
pub struct SimpleOracle {
    kinds: FxHashMap<TypeId, TypeKind>,
    tuples: FxHashMap<TypeId, TupleArity>,
    iterators: FxHashSet<TypeId>,
    macro_members: FxHashMap<(TypeId, String), CapabilityMember>,
    exported_mutable: FxHashSet<BindingId>,
    class_symbols: FxHashSet<BindingId>,
    const_enums: FxHashMap<BindingId, FxHashMap<String, EnumValue>>,
    forward_referenced: FxHashSet<BindingId>,
    self_references: FxHashMap<BindingId, usize>,
    receiverless_methods: FxHashSet<(TypeId, String)>,
}

impl SimpleOracle {
    /// Create an oracle that knows only the primitive types
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type's classification
    pub fn register_type(&mut self, ty: TypeId, kind: TypeKind) -> &mut Self {
        self.kinds.insert(ty, kind);
        self
    }

    /// Register a fixed- or dynamic-arity tuple type
    pub fn register_tuple(&mut self, ty: TypeId, arity: TupleArity) -> &mut Self {
        self.kinds.insert(ty, TypeKind::Tuple);
        self.tuples.insert(ty, arity);
        self
    }

    /// Mark a type as satisfying the iterator capability
    pub fn register_iterator(&mut self, ty: TypeId) -> &mut Self {
        self.iterators.insert(ty);
        self
    }

    /// Register a capability-macro member on a type
    pub fn register_macro_member(
        &mut self,
        ty: TypeId,
        name: &str,
        member: CapabilityMember,
    ) -> &mut Self {
        self.macro_members.insert((ty, name.to_string()), member);
        self
    }

    /// Mark a binding as an exported mutable declaration
    pub fn register_exported_mutable(&mut self, binding: BindingId) -> &mut Self {
        self.exported_mutable.insert(binding);
        self
    }

    /// Mark a binding as a class name
    pub fn register_class_symbol(&mut self, binding: BindingId) -> &mut Self {
        self.class_symbols.insert(binding);
        self
    }

    /// Register a constant enumeration and its member values
    pub fn register_const_enum(
        &mut self,
        binding: BindingId,
        members: impl IntoIterator<Item = (&'static str, EnumValue)>,
    ) -> &mut Self {
        let table = members
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        self.const_enums.insert(binding, table);
        self
    }

    /// Mark a declaration as referenced before its lexical position
    pub fn register_forward_reference(&mut self, binding: BindingId) -> &mut Self {
        self.forward_referenced.insert(binding);
        self
    }

    /// Record how often a named function expression refers to itself
    pub fn register_self_references(&mut self, binding: BindingId, count: usize) -> &mut Self {
        self.self_references.insert(binding, count);
        self
    }

    /// Mark an instance method as declaring its receiver absent (`this: void`)
    pub fn register_receiverless_method(&mut self, ty: TypeId, name: &str) -> &mut Self {
        self.receiverless_methods.insert((ty, name.to_string()));
        self
    }
}

impl TypeOracle for SimpleOracle {
    fn kind(&self, ty: TypeId) -> TypeKind {
        if let Some(&kind) = self.kinds.get(&ty) {
            return kind;
        }
        match ty {
            TypeId::NUMBER => TypeKind::Number,
            TypeId::STRING => TypeKind::String,
            TypeId::BOOLEAN => TypeKind::Boolean,
            TypeId::NIL => TypeKind::Nil,
            TypeId::VOID => TypeKind::Void,
            _ => TypeKind::Unknown,
        }
    }

    fn tuple_arity(&self, ty: TypeId) -> Option<TupleArity> {
        self.tuples.get(&ty).copied()
    }

    fn satisfies_iterator(&self, ty: TypeId) -> bool {
        self.iterators.contains(&ty)
    }

    fn capability_member(&self, ty: TypeId, name: &str) -> Option<CapabilityMember> {
        if let Some(&member) = self.macro_members.get(&(ty, name.to_string())) {
            return Some(member);
        }
        if name == "length" && matches!(self.kind(ty), TypeKind::Array | TypeKind::String) {
            return Some(CapabilityMember::Length);
        }
        None
    }

    fn is_exported_mutable(&self, binding: BindingId) -> bool {
        self.exported_mutable.contains(&binding)
    }

    fn is_class_symbol(&self, binding: BindingId) -> bool {
        self.class_symbols.contains(&binding)
    }

    fn is_const_enum(&self, binding: BindingId) -> bool {
        self.const_enums.contains_key(&binding)
    }

    fn enum_member_value(&self, binding: BindingId, member: &str) -> Option<EnumValue> {
        self.const_enums.get(&binding)?.get(member).cloned()
    }

    fn referenced_before_declaration(&self, binding: BindingId) -> bool {
        self.forward_referenced.contains(&binding)
    }

    fn self_reference_count(&self, binding: BindingId) -> usize {
        self.self_references.get(&binding).copied().unwrap_or(0)
    }

    fn method_binds_receiver(&self, ty: TypeId, name: &str) -> bool {
        !self.receiverless_methods.contains(&(ty, name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_kinds_preseeded() {
        let oracle = SimpleOracle::new();
        assert_eq!(oracle.kind(TypeId::NUMBER), TypeKind::Number);
        assert_eq!(oracle.kind(TypeId::STRING), TypeKind::String);
        assert_eq!(oracle.kind(TypeId::new(99)), TypeKind::Unknown);
    }

    #[test]
    fn test_length_macro_on_arrays_and_strings() {
        let mut oracle = SimpleOracle::new();
        let arr = TypeId::new(TypeId::FIRST_USER);
        oracle.register_type(arr, TypeKind::Array);
        assert_eq!(
            oracle.capability_member(arr, "length"),
            Some(CapabilityMember::Length)
        );
        assert_eq!(
            oracle.capability_member(TypeId::STRING, "length"),
            Some(CapabilityMember::Length)
        );
        assert_eq!(oracle.capability_member(TypeId::NUMBER, "length"), None);
    }

    #[test]
    fn test_reserved_name_prefixes() {
        let oracle = SimpleOracle::new();
        assert!(oracle.is_reserved_name("____temp_0"));
        assert!(oracle.is_reserved_name("__vela_async"));
        assert!(!oracle.is_reserved_name("length"));
    }
}
