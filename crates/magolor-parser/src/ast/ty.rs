use std::fmt;

/// A surface-language type.
///
/// Invariant: after a successful check, every `Class` name refers to a class
/// declared in some registered module or imported from one. `Error` is the
/// checker's synthetic type for failed sub-expressions; it is assignable in
/// both directions to suppress diagnostic cascades.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Int,
    Float,
    Bool,
    String,
    Void,
    Class(String),
    Option(Box<Type>),
    Array(Box<Type>),
    Function { params: Vec<Type>, ret: Box<Type> },
    Error,
}

impl Type {
    /// Whether this type participates in arithmetic and numeric widening.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Bool => write!(f, "bool"),
            Type::String => write!(f, "string"),
            Type::Void => write!(f, "void"),
            Type::Class(name) => write!(f, "{name}"),
            Type::Option(inner) => write!(f, "Option<{inner}>"),
            Type::Array(elem) => write!(f, "Array<{elem}>"),
            Type::Function { params, ret } => {
                write!(f, "fn(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") -> {ret}")
            }
            Type::Error => write!(f, "{{error}}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_common_shapes() {
        assert_eq!(Type::Int.to_string(), "int");
        assert_eq!(Type::Option(Box::new(Type::Int)).to_string(), "Option<int>");
        assert_eq!(Type::Array(Box::new(Type::String)).to_string(), "Array<string>");
        assert_eq!(
            Type::Function {
                params: vec![Type::Int, Type::Float],
                ret: Box::new(Type::Bool),
            }
            .to_string(),
            "fn(int, float) -> bool"
        );
        assert_eq!(Type::Class("Point".into()).to_string(), "Point");
    }

    #[test]
    fn numeric_classification() {
        assert!(Type::Int.is_numeric());
        assert!(Type::Float.is_numeric());
        assert!(!Type::String.is_numeric());
        assert!(!Type::Option(Box::new(Type::Int)).is_numeric());
    }
}
