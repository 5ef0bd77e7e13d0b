//! Types and argument intents carried by variables and expressions.
//! 变量和表达式携带的类型与参数意图。

use std::fmt;

use crate::ExprId;

/// The type of a variable or expression. / 变量或表达式的类型。
#[derive(Debug, Clone, PartialEq)]
pub enum Ttype {
    Integer { kind: u8 },
    Real { kind: u8 },
    Logical { kind: u8 },
    Character,
    Array { element: Box<Ttype>, dims: Vec<ArrayDim> },
    /// Storage acquired at run time by `allocate`.
    Allocatable(Box<Ttype>),
}

/// One dimension of an array type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayDim {
    /// `:`
    Deferred,
    /// Extent given by an expression.
    Explicit(ExprId),
}

impl Ttype {
    pub const DEFAULT_INTEGER: Ttype = Ttype::Integer { kind: 4 };
    pub const DEFAULT_REAL: Ttype = Ttype::Real { kind: 4 };
    pub const DEFAULT_LOGICAL: Ttype = Ttype::Logical { kind: 4 };

    /// Whether the storage is an array, looking through `Allocatable`.
    pub fn is_array(&self) -> bool {
        match self {
            Ttype::Array { .. } => true,
            Ttype::Allocatable(inner) => inner.is_array(),
            _ => false,
        }
    }

    pub fn is_allocatable(&self) -> bool {
        matches!(self, Ttype::Allocatable(_))
    }

    pub fn is_logical(&self) -> bool {
        matches!(self.strip_allocatable(), Ttype::Logical { .. })
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self.strip_allocatable(),
            Ttype::Integer { .. } | Ttype::Real { .. }
        )
    }

    pub fn strip_allocatable(&self) -> &Ttype {
        match self {
            Ttype::Allocatable(inner) => inner,
            other => other,
        }
    }

    /// Element type of an array, or the type itself for scalars.
    pub fn element(&self) -> &Ttype {
        match self.strip_allocatable() {
            Ttype::Array { element, .. } => element,
            other => other,
        }
    }

    pub fn rank(&self) -> usize {
        self.dims().map_or(0, <[ArrayDim]>::len)
    }

    pub fn dims(&self) -> Option<&[ArrayDim]> {
        match self.strip_allocatable() {
            Ttype::Array { dims, .. } => Some(dims),
            _ => None,
        }
    }

    pub(crate) fn dims_mut(&mut self) -> Option<&mut Vec<ArrayDim>> {
        match self {
            Ttype::Array { dims, .. } => Some(dims),
            Ttype::Allocatable(inner) => inner.dims_mut(),
            _ => None,
        }
    }
}

impl fmt::Display for Ttype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ttype::Integer { kind } => write!(f, "integer({kind})"),
            Ttype::Real { kind } => write!(f, "real({kind})"),
            Ttype::Logical { kind } => write!(f, "logical({kind})"),
            Ttype::Character => f.write_str("character"),
            Ttype::Array { element, dims } => {
                write!(f, "{element}(")?;
                for (i, dim) in dims.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    match dim {
                        ArrayDim::Deferred => f.write_str(":")?,
                        ArrayDim::Explicit(id) => write!(f, "{id:?}")?,
                    }
                }
                f.write_str(")")
            }
            Ttype::Allocatable(inner) => write!(f, "allocatable {inner}"),
        }
    }
}

/// How a variable relates to its scope. / 变量与其作用域的关系。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Declared inside the scope and owned by it.
    Local,
    In,
    Out,
    InOut,
    /// The result variable of a function.
    ReturnVar,
    /// A dummy argument declared without `intent`.
    Unspecified,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Local => "local",
            Intent::In => "in",
            Intent::Out => "out",
            Intent::InOut => "inout",
            Intent::ReturnVar => "return",
            Intent::Unspecified => "unspecified",
        }
    }

    pub fn is_dummy(self) -> bool {
        matches!(
            self,
            Intent::In | Intent::Out | Intent::InOut | Intent::Unspecified
        )
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allocatable_vector() -> Ttype {
        Ttype::Allocatable(Box::new(Ttype::Array {
            element: Box::new(Ttype::DEFAULT_REAL),
            dims: vec![ArrayDim::Deferred],
        }))
    }

    #[test]
    fn test_is_array_looks_through_allocatable() {
        let ty = allocatable_vector();
        assert!(ty.is_array());
        assert!(ty.is_allocatable());
        assert_eq!(ty.rank(), 1);
        assert_eq!(ty.element(), &Ttype::DEFAULT_REAL);
    }

    #[test]
    fn test_allocatable_scalar_is_not_an_array() {
        let ty = Ttype::Allocatable(Box::new(Ttype::DEFAULT_INTEGER));
        assert!(!ty.is_array());
        assert!(ty.is_allocatable());
        assert_eq!(ty.rank(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(allocatable_vector().to_string(), "allocatable real(4)(:)");
        assert_eq!(Intent::InOut.to_string(), "inout");
    }
}
