/// A sequence of statements optionally ended by `return`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub ret: Option<Vec<Expression>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Local {
        names: Vec<String>,
        values: Vec<Expression>,
    },
    /// Targets are `Name` or `Index` expressions.
    Assign {
        targets: Vec<Expression>,
        values: Vec<Expression>,
    },
    /// A `Call` or `MethodCall` whose results are discarded.
    Call(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Nil,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
    VarArgs,
    Name(String),
    /// `object[key]`, and `object.name` with a string key.
    Index {
        object: Box<Expression>,
        key: Box<Expression>,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
    },
    MethodCall {
        object: Box<Expression>,
        method: String,
        args: Vec<Expression>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Table(Vec<TableField>),
    /// Parentheses truncate a multi-value expression to one value.
    Paren(Box<Expression>),
}

impl Expression {
    pub fn is_call(&self) -> bool {
        matches!(self, Expression::Call { .. } | Expression::MethodCall { .. })
    }

    pub fn is_assignable(&self) -> bool {
        matches!(self, Expression::Name(_) | Expression::Index { .. })
    }

    /// Calls and `...` produce a variable number of values.
    pub fn is_multi_valued(&self) -> bool {
        self.is_call() || matches!(self, Expression::VarArgs)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableField {
    Positional(Expression),
    Keyed(Expression, Expression),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn from_symbol(symbol: &str) -> Option<BinaryOp> {
        Some(match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            ".." => BinaryOp::Concat,
            "==" => BinaryOp::Eq,
            "~=" => BinaryOp::NotEq,
            "<" => BinaryOp::Less,
            "<=" => BinaryOp::LessEq,
            ">" => BinaryOp::Greater,
            ">=" => BinaryOp::GreaterEq,
            "and" => BinaryOp::And,
            "or" => BinaryOp::Or,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,
    Not,
}
