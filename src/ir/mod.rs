//! # CSawIR
//!
//! The in-memory representation: interned types, values, instructions chained
//! per label, functions with overloads, and globals. Everything is owned by a
//! [Context].

mod builder;
mod constant;
mod context;
mod global;
mod inst;
mod label;
mod ty;
mod value;

pub use builder::{BuildError, Builder};
pub use constant::{escape, unescape, Constant, ConstantError, ConstantKind};
pub use context::{Context, DisplayContext};
pub use global::{Func, FuncData, Global, GlobalData};
pub use inst::{Inst, InstData, InstKind};
pub use label::{Label, LabelData};
pub use ty::{Ty, TyData, TyError, TyKind};
pub use value::{Value, ValueData, ValueKind};
