//! Built-in function table

/// Every function name the parser accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Ln,
    Log,
    Sqrt,
    Abs,
    Exp,
    // Higher-order forms, resolved by the symbolic delegate
    Integrate,
    Diff,
    Sum,
    Limit,
    // Array functions, routed to the matrix and stats engines
    Det,
    Dot,
    Norm,
    Mean,
    Median,
    Stddev,
    Corr,
}

static BUILTINS: [(&str, Builtin); 25] = [
    ("sin", Builtin::Sin),
    ("cos", Builtin::Cos),
    ("tan", Builtin::Tan),
    ("asin", Builtin::Asin),
    ("acos", Builtin::Acos),
    ("atan", Builtin::Atan),
    ("sinh", Builtin::Sinh),
    ("cosh", Builtin::Cosh),
    ("tanh", Builtin::Tanh),
    ("ln", Builtin::Ln),
    ("log", Builtin::Log),
    ("sqrt", Builtin::Sqrt),
    ("abs", Builtin::Abs),
    ("exp", Builtin::Exp),
    ("integrate", Builtin::Integrate),
    ("diff", Builtin::Diff),
    ("sum", Builtin::Sum),
    ("limit", Builtin::Limit),
    ("det", Builtin::Det),
    ("dot", Builtin::Dot),
    ("norm", Builtin::Norm),
    ("mean", Builtin::Mean),
    ("median", Builtin::Median),
    ("stddev", Builtin::Stddev),
    ("corr", Builtin::Corr),
];

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        BUILTINS.iter().find(|(n, _)| *n == name).map(|(_, b)| *b)
    }

    pub fn name(&self) -> &'static str {
        BUILTINS
            .iter()
            .find(|(_, b)| b == self)
            .map(|(n, _)| *n)
            .unwrap_or("?")
    }

    /// Accepted argument count, inclusive range
    pub fn arity(&self) -> (usize, usize) {
        match self {
            Builtin::Log => (1, 2),
            Builtin::Integrate => (1, 4),
            Builtin::Diff => (1, 3),
            Builtin::Sum => (4, 4),
            Builtin::Limit => (3, 3),
            Builtin::Dot | Builtin::Corr => (2, 2),
            _ => (1, 1),
        }
    }

    pub fn is_higher_order(&self) -> bool {
        matches!(
            self,
            Builtin::Integrate | Builtin::Diff | Builtin::Sum | Builtin::Limit
        )
    }

    /// Takes list arguments instead of scalars
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            Builtin::Det
                | Builtin::Dot
                | Builtin::Norm
                | Builtin::Mean
                | Builtin::Median
                | Builtin::Stddev
                | Builtin::Corr
        )
    }

    pub fn all() -> impl Iterator<Item = Builtin> {
        BUILTINS.iter().map(|(_, b)| *b)
    }
}

/// Describe an arity range for error messages
pub fn arity_text(min: usize, max: usize) -> String {
    if min == max {
        min.to_string()
    } else {
        format!("{} to {}", min, max)
    }
}
