//! Captures the list/non-null wrapping of a type usage and replays it onto a
//! materialized type.

use crate::schema::TypeRef;
use gqlbind_core::SourceLocation;
use gqlbind_syntax::ast;

/// One layer of decoration around a named type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wrapping {
    List,
    NonNull,
}

/// The bare name of a type usage plus its decoration stack.
///
/// `[Pet!]!` is recorded as the name `Pet` with the stack
/// `[NonNull, List, NonNull]`, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    name: String,
    location: SourceLocation,
    wrapping: Vec<Wrapping>,
}

impl TypeInfo {
    /// Strips all decoration from a type usage.
    pub fn new(ty: &ast::Type) -> Self {
        let mut wrapping = Vec::new();
        let mut current = ty;
        loop {
            match current {
                ast::Type::List(inner, _) => {
                    wrapping.push(Wrapping::List);
                    current = inner;
                }
                ast::Type::NonNull(inner, _) => {
                    wrapping.push(Wrapping::NonNull);
                    current = inner;
                }
                ast::Type::Named(named) => {
                    return Self {
                        name: named.name.clone(),
                        location: named.location,
                        wrapping,
                    };
                }
            }
        }
    }

    /// Returns the bare type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns where the bare name is written.
    pub fn location(&self) -> SourceLocation {
        self.location
    }

    /// Returns the decoration stack, outermost first.
    pub fn wrapping(&self) -> &[Wrapping] {
        &self.wrapping
    }

    /// Applies the recorded decoration to `ty`, innermost layer first.
    pub fn decorate(&self, ty: TypeRef) -> TypeRef {
        self.wrapping.iter().rev().fold(ty, |ty, wrapping| match wrapping {
            Wrapping::List => ty.list(),
            Wrapping::NonNull => ty.non_null(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(wrapping: &[Wrapping]) -> ast::Type {
        wrapping
            .iter()
            .rev()
            .fold(ast::Type::named("Pet"), |ty, wrapping| match wrapping {
                Wrapping::List => ty.list(),
                Wrapping::NonNull => ty.non_null(),
            })
    }

    #[test]
    fn test_strip_records_outermost_first() {
        let info = TypeInfo::new(&ast::Type::named("Pet").non_null().list().non_null());
        assert_eq!(info.name(), "Pet");
        assert_eq!(
            info.wrapping(),
            [Wrapping::NonNull, Wrapping::List, Wrapping::NonNull]
        );
    }

    #[test]
    fn test_decorate_reproduces_nesting() {
        use Wrapping::{List, NonNull};

        let shapes: [&[Wrapping]; 6] = [
            &[],
            &[NonNull],
            &[List],
            &[NonNull, List, NonNull],
            &[List, NonNull, List],
            &[NonNull, List, NonNull, List, List, NonNull],
        ];

        for shape in shapes {
            let ty = usage(shape);
            let info = TypeInfo::new(&ty);
            assert_eq!(info.wrapping(), shape);
            let decorated = info.decorate(TypeRef::Reference("Pet".to_string()));
            assert_eq!(decorated.to_string(), ty.to_string());
        }
    }
}
