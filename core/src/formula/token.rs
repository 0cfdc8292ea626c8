//! Tokens produced by the expression scanner.

/// Operator associativity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

/// Static description of a binary operator.
#[derive(Debug, Clone, Copy)]
pub struct OperatorSpec {
    pub symbol: char,
    pub precedence: u8,
    pub associativity: Associativity,
    pub apply: fn(f64, f64) -> f64,
}

fn add(a: f64, b: f64) -> f64 {
    a + b
}

fn sub(a: f64, b: f64) -> f64 {
    a - b
}

fn mul(a: f64, b: f64) -> f64 {
    a * b
}

fn div(a: f64, b: f64) -> f64 {
    a / b
}

static ADD: OperatorSpec = OperatorSpec {
    symbol: '+',
    precedence: 10,
    associativity: Associativity::Left,
    apply: add,
};

static SUB: OperatorSpec = OperatorSpec {
    symbol: '-',
    precedence: 10,
    associativity: Associativity::Left,
    apply: sub,
};

static MUL: OperatorSpec = OperatorSpec {
    symbol: '*',
    precedence: 20,
    associativity: Associativity::Left,
    apply: mul,
};

static DIV: OperatorSpec = OperatorSpec {
    symbol: '/',
    precedence: 20,
    associativity: Associativity::Left,
    apply: div,
};

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            _ => None,
        }
    }

    pub fn spec(&self) -> &'static OperatorSpec {
        match self {
            Operator::Add => &ADD,
            Operator::Sub => &SUB,
            Operator::Mul => &MUL,
            Operator::Div => &DIV,
        }
    }

    pub fn precedence(&self) -> u8 {
        self.spec().precedence
    }

    pub fn symbol(&self) -> char {
        self.spec().symbol
    }

    pub fn apply(&self, a: f64, b: f64) -> f64 {
        (self.spec().apply)(a, b)
    }

    /// Whether `self`, sitting on the operator stack, must be emitted before
    /// `incoming` is pushed.
    pub fn yields_to(&self, incoming: Operator) -> bool {
        let top = self.precedence();
        let next = incoming.precedence();
        match incoming.spec().associativity {
            Associativity::Left => top >= next,
            Associativity::Right => top > next,
        }
    }
}

/// A scanned token. Parenthesized groups are reduced before they become tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    Number(f64),
    Operator(Operator),
}
