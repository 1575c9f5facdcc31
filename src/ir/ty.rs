use std::fmt;

use thiserror::Error;

use super::Context;
use crate::collections::storage::{ArenaDeref, ArenaPtr, BaseArenaPtr};

/// The type kinds.
#[derive(Debug, Hash, Clone, PartialEq, Eq)]
pub enum TyKind {
    /// The unit type of functions returning nothing.
    Void,
    /// A double precision floating point number.
    Num,
    /// An 8-bit character.
    Chr,
    /// A string, pointer-like to [TyKind::Chr].
    Str,
    /// A fixed-size array.
    Array {
        /// The element type.
        elem: Ty,
        /// The number of elements in the array.
        size: usize,
    },
    /// A function signature.
    ///
    /// Functions are overloaded by this type, so two signatures with the same
    /// shape must be the same [Ty].
    Func {
        ret: Ty,
        params: Vec<Ty>,
        /// Whether extra arguments may follow the fixed parameters.
        varargs: bool,
    },
}

/// The data of an interned type.
///
/// The canonical name is the interning key, see
/// [Context::get_or_create_ty].
#[derive(Debug)]
pub struct TyData {
    name: String,
    kind: TyKind,
}

/// The type in IR.
///
/// [Ty] is a handle to a [TyData] interned in the [Context], so two types are
/// structurally equal iff their handles are equal.
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq)]
pub struct Ty(BaseArenaPtr<TyData>);

// [Ty] cannot be allocated through `ArenaAlloc`, otherwise duplicated types
// could bypass the name table. So the arena traits are implemented manually.

impl ArenaPtr for Ty {
    type A = Context;
    type T = TyData;

    fn try_deref(self, ctx: &Self::A) -> Option<&Self::T> { ArenaDeref::try_deref(ctx, self) }

    fn try_deref_mut(self, ctx: &mut Self::A) -> Option<&mut Self::T> {
        ArenaDeref::try_deref_mut(ctx, self)
    }
}

impl ArenaDeref<TyData, Ty> for Context {
    fn try_deref(&self, ptr: Ty) -> Option<&TyData> { self.tys.try_deref(ptr.0) }

    fn try_deref_mut(&mut self, ptr: Ty) -> Option<&mut TyData> { self.tys.try_deref_mut(ptr.0) }
}

/// Errors when resolving a type from its name.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TyError {
    /// The size between the brackets is not a decimal number.
    #[error("malformed array size in type `{0}`")]
    MalformedArraySize(String),

    /// The array suffix is not closed by `]`.
    #[error("malformed type name `{0}`")]
    MalformedTypeName(String),
}

impl Context {
    /// Get the type named `name`, or create it with `factory`.
    ///
    /// Only the first call for a given name runs its factory, every later call
    /// returns the same [Ty]. The factory is trusted to build a type whose
    /// canonical name is `name`.
    pub fn get_or_create_ty<F>(&mut self, name: impl Into<String>, factory: F) -> Ty
    where
        F: FnOnce() -> TyKind,
    {
        let name = name.into();
        if let Some(ty) = self.ty_names.get(&name) {
            return *ty;
        }
        let ty = Ty(self.tys.alloc(TyData {
            name: name.clone(),
            kind: factory(),
        }));
        self.ty_names.insert(name, ty);
        ty
    }

    /// Resolve a type from its canonical name.
    ///
    /// Primitive names are always resolvable, array names (`<elem>[<size>]`)
    /// are resolved recursively on the part before the last `[`, and any
    /// other name must have been interned before.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ty))` if the name denotes a type.
    /// - `Ok(None)` if the name (or the element of an array name) is unknown.
    /// - `Err(_)` if an array suffix is malformed.
    pub fn ty_by_name(&mut self, name: &str) -> Result<Option<Ty>, TyError> {
        if let Some(ty) = self.ty_names.get(name) {
            return Ok(Some(*ty));
        }

        match name {
            "void" => return Ok(Some(Ty::void(self))),
            "num" => return Ok(Some(Ty::num(self))),
            "chr" => return Ok(Some(Ty::chr(self))),
            "str" => return Ok(Some(Ty::str_(self))),
            _ => {}
        }

        let Some(idx) = name.rfind('[') else {
            return Ok(None);
        };

        let size = name[idx + 1..]
            .strip_suffix(']')
            .ok_or_else(|| TyError::MalformedTypeName(name.to_string()))?;
        let size = size
            .parse::<usize>()
            .map_err(|_| TyError::MalformedArraySize(name.to_string()))?;

        match self.ty_by_name(&name[..idx])? {
            Some(elem) => Ok(Some(Ty::array(self, elem, size))),
            None => Ok(None),
        }
    }

    /// All the interned types, in creation order.
    pub fn tys(&self) -> Vec<Ty> { self.tys.iter().map(|(ptr, _)| Ty(ptr)).collect() }
}

impl Ty {
    pub fn void(ctx: &mut Context) -> Self { ctx.get_or_create_ty("void", || TyKind::Void) }

    pub fn num(ctx: &mut Context) -> Self { ctx.get_or_create_ty("num", || TyKind::Num) }

    pub fn chr(ctx: &mut Context) -> Self { ctx.get_or_create_ty("chr", || TyKind::Chr) }

    pub fn str_(ctx: &mut Context) -> Self { ctx.get_or_create_ty("str", || TyKind::Str) }

    pub fn array(ctx: &mut Context, elem: Ty, size: usize) -> Self {
        let name = format!("{}[{}]", elem.name(ctx), size);
        ctx.get_or_create_ty(name, || TyKind::Array { elem, size })
    }

    /// Get the function type `<ret>(<param>, ...)[?]`.
    pub fn func(ctx: &mut Context, ret: Ty, params: Vec<Ty>, varargs: bool) -> Self {
        let mut name = format!("{}(", ret.name(ctx));
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                name.push_str(", ");
            }
            name.push_str(param.name(ctx));
        }
        name.push(')');
        if varargs {
            name.push('?');
        }

        ctx.get_or_create_ty(name, || TyKind::Func {
            ret,
            params,
            varargs,
        })
    }

    /// The canonical name of the type.
    pub fn name(self, ctx: &Context) -> &str { &self.deref(ctx).name }

    pub fn kind(self, ctx: &Context) -> &TyKind { &self.deref(ctx).kind }

    pub fn is_func(self, ctx: &Context) -> bool { matches!(self.kind(ctx), TyKind::Func { .. }) }

    /// The return type, if this is a function type.
    pub fn ret_ty(self, ctx: &Context) -> Option<Ty> {
        if let TyKind::Func { ret, .. } = self.kind(ctx) {
            Some(*ret)
        } else {
            None
        }
    }

    /// The fixed parameter types, empty if this is not a function type.
    pub fn params(self, ctx: &Context) -> &[Ty] {
        if let TyKind::Func { params, .. } = self.kind(ctx) {
            params
        } else {
            &[]
        }
    }

    pub fn is_varargs(self, ctx: &Context) -> bool {
        matches!(self.kind(ctx), TyKind::Func { varargs: true, .. })
    }

    pub fn elem_ty(self, ctx: &Context) -> Option<Ty> {
        if let TyKind::Array { elem, .. } = self.kind(ctx) {
            Some(*elem)
        } else {
            None
        }
    }

    pub fn array_size(self, ctx: &Context) -> Option<usize> {
        if let TyKind::Array { size, .. } = self.kind(ctx) {
            Some(*size)
        } else {
            None
        }
    }

    pub fn display(self, ctx: &Context) -> DisplayTy<'_> { DisplayTy { ctx, ty: self } }
}

pub struct DisplayTy<'a> {
    ctx: &'a Context,
    ty: Ty,
}

impl fmt::Display for DisplayTy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ty.name(self.ctx))
    }
}
