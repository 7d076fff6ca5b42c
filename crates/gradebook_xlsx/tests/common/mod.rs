//! Small evaluator for the formula subset the gradebook emits:
//! numbers, strings, refs, row ranges, quoted sheet refs, `+ * = > >=`,
//! and `IF`, `AND`, `ISNUMBER`, `COUNT`, `AVERAGE`.
#![allow(dead_code)]

use gradebook_xlsx::{EnumCellValue, SpecWorkbookDocument};

const N_DEPTH_MAX: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum EnumEvalValue {
    Blank,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl EnumEvalValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            EnumEvalValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Blank cell or the empty string a formula returns for "no value".
    pub fn is_empty_result(&self) -> bool {
        match self {
            EnumEvalValue::Blank => true,
            EnumEvalValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

/// Evaluate the 1-based `(row, col)` cell of `sheet_name`.
pub fn evaluate_cell(doc: &SpecWorkbookDocument, sheet_name: &str, row: usize, col: usize) -> EnumEvalValue {
    evaluate_cell_at(doc, sheet_name, row, col, 0)
}

fn evaluate_cell_at(doc: &SpecWorkbookDocument, sheet_name: &str, row: usize, col: usize, depth: usize) -> EnumEvalValue {
    assert!(depth < N_DEPTH_MAX, "formula references nest too deep at {sheet_name}!R{row}C{col}");
    let sheet = doc
        .sheet(sheet_name)
        .unwrap_or_else(|| panic!("unknown sheet {sheet_name:?}"));
    match sheet.value(row, col) {
        None | Some(EnumCellValue::None) => EnumEvalValue::Blank,
        Some(EnumCellValue::Number(n)) => EnumEvalValue::Number(*n),
        Some(EnumCellValue::String(s)) => EnumEvalValue::Text(s.clone()),
        Some(EnumCellValue::Formula(f)) => {
            let ctx = EvalContext {
                doc,
                sheet_name,
                depth: depth + 1,
            };
            ctx.eval(&parse_formula(f))
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// #region Parser

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Str(String),
    Ident(String),
    QuotedSheet(String),
    Op(String),
    LParen,
    RParen,
    Comma,
    Colon,
    Bang,
}

#[derive(Debug, Clone)]
enum Expr {
    Num(f64),
    Str(String),
    Ref(Option<String>, usize, usize),
    Range(usize, usize, usize),
    Binary(String, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

fn read_quoted(chars: &[char], i: &mut usize, quote: char) -> String {
    let mut out = String::new();
    *i += 1;
    while chars[*i] != quote || chars.get(*i + 1) == Some(&quote) {
        out.push(chars[*i]);
        *i += if chars[*i] == quote { 2 } else { 1 };
    }
    *i += 1;
    out
}

fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut l_tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let token = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            ':' => Token::Colon,
            '!' => Token::Bang,
            '=' | '+' | '*' => Token::Op(c.to_string()),
            '>' if chars.get(i + 1) == Some(&'=') => {
                i += 1;
                Token::Op(">=".to_string())
            }
            '>' => Token::Op(">".to_string()),
            '"' => {
                l_tokens.push(Token::Str(read_quoted(&chars, &mut i, '"')));
                continue;
            }
            '\'' => {
                l_tokens.push(Token::QuotedSheet(read_quoted(&chars, &mut i, '\'')));
                continue;
            }
            _ if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let c_num: String = chars[start..i].iter().collect();
                l_tokens.push(Token::Num(c_num.parse().expect("numeric literal")));
                continue;
            }
            _ if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                l_tokens.push(Token::Ident(chars[start..i].iter().collect()));
                continue;
            }
            _ => panic!("unexpected character {c:?} in formula {text:?}"),
        };
        l_tokens.push(token);
        i += 1;
    }
    l_tokens
}

/// `B3` -> `(3, 2)`.
fn parse_cell_name(name: &str) -> (usize, usize) {
    let n_letters = name.chars().take_while(char::is_ascii_alphabetic).count();
    let n_col = name[..n_letters]
        .bytes()
        .fold(0usize, |acc, b| acc * 26 + (b - b'A' + 1) as usize);
    let n_row = name[n_letters..]
        .parse()
        .unwrap_or_else(|_| panic!("bad cell reference {name:?}"));
    (n_row, n_col)
}

fn parse_formula(text: &str) -> Expr {
    let mut parser = Parser {
        l_tokens: tokenize(text.strip_prefix('=').unwrap_or(text)),
        pos: 0,
    };
    let expr = parser.parse_comparison();
    assert_eq!(parser.pos, parser.l_tokens.len(), "trailing tokens in formula {text:?}");
    expr
}

struct Parser {
    l_tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn next(&mut self) -> Token {
        let token = self.l_tokens[self.pos].clone();
        self.pos += 1;
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        let if_match = self.l_tokens.get(self.pos) == Some(token);
        if if_match {
            self.pos += 1;
        }
        if_match
    }

    fn eat_op(&mut self, l_ops: &[&str]) -> Option<String> {
        match self.l_tokens.get(self.pos) {
            Some(Token::Op(op)) if l_ops.contains(&op.as_str()) => {
                let op = op.clone();
                self.pos += 1;
                Some(op)
            }
            _ => None,
        }
    }

    fn parse_comparison(&mut self) -> Expr {
        let lhs = self.parse_sum();
        match self.eat_op(&["=", ">", ">="]) {
            Some(op) => Expr::Binary(op, Box::new(lhs), Box::new(self.parse_sum())),
            None => lhs,
        }
    }

    fn parse_sum(&mut self) -> Expr {
        let mut lhs = self.parse_product();
        while let Some(op) = self.eat_op(&["+"]) {
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(self.parse_product()));
        }
        lhs
    }

    fn parse_product(&mut self) -> Expr {
        let mut lhs = self.parse_primary();
        while let Some(op) = self.eat_op(&["*"]) {
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(self.parse_primary()));
        }
        lhs
    }

    fn parse_primary(&mut self) -> Expr {
        match self.next() {
            Token::Num(n) => Expr::Num(n),
            Token::Str(s) => Expr::Str(s),
            Token::QuotedSheet(sheet) => {
                assert!(self.eat(&Token::Bang), "expected '!' after sheet name");
                let Token::Ident(c_cell) = self.next() else {
                    panic!("expected a cell after sheet name");
                };
                let (row, col) = parse_cell_name(&c_cell);
                Expr::Ref(Some(sheet), row, col)
            }
            Token::Ident(name) if self.eat(&Token::LParen) => {
                let mut l_args = Vec::new();
                while !self.eat(&Token::RParen) {
                    l_args.push(self.parse_comparison());
                    self.eat(&Token::Comma);
                }
                Expr::Call(name, l_args)
            }
            Token::Ident(c_cell) => {
                let (row, col) = parse_cell_name(&c_cell);
                if !self.eat(&Token::Colon) {
                    return Expr::Ref(None, row, col);
                }
                let Token::Ident(c_end) = self.next() else {
                    panic!("expected a range end");
                };
                let (row_end, col_end) = parse_cell_name(&c_end);
                assert_eq!(row, row_end, "only single-row ranges are emitted");
                Expr::Range(row, col, col_end)
            }
            other => panic!("unexpected token {other:?}"),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Evaluation

struct EvalContext<'a> {
    doc: &'a SpecWorkbookDocument,
    sheet_name: &'a str,
    depth: usize,
}

impl EvalContext<'_> {
    fn eval(&self, expr: &Expr) -> EnumEvalValue {
        match expr {
            Expr::Num(n) => EnumEvalValue::Number(*n),
            Expr::Str(s) => EnumEvalValue::Text(s.clone()),
            Expr::Ref(sheet, row, col) => {
                let c_sheet = sheet.as_deref().unwrap_or(self.sheet_name);
                evaluate_cell_at(self.doc, c_sheet, *row, *col, self.depth)
            }
            Expr::Range(..) => panic!("range outside COUNT/AVERAGE"),
            Expr::Binary(op, lhs, rhs) => eval_binary(op, self.eval(lhs), self.eval(rhs)),
            Expr::Call(name, l_args) => self.eval_call(name, l_args),
        }
    }

    fn eval_call(&self, name: &str, l_args: &[Expr]) -> EnumEvalValue {
        match name {
            "IF" => {
                if is_truthy(&self.eval(&l_args[0])) {
                    self.eval(&l_args[1])
                } else {
                    self.eval(&l_args[2])
                }
            }
            "AND" => EnumEvalValue::Bool(l_args.iter().all(|arg| is_truthy(&self.eval(arg)))),
            "ISNUMBER" => EnumEvalValue::Bool(matches!(self.eval(&l_args[0]), EnumEvalValue::Number(_))),
            "COUNT" => EnumEvalValue::Number(self.collect_numbers(l_args).len() as f64),
            "AVERAGE" => {
                let l_numbers = self.collect_numbers(l_args);
                assert!(!l_numbers.is_empty(), "AVERAGE over no numbers");
                EnumEvalValue::Number(l_numbers.iter().sum::<f64>() / l_numbers.len() as f64)
            }
            _ => panic!("unsupported function {name}"),
        }
    }

    fn collect_numbers(&self, l_args: &[Expr]) -> Vec<f64> {
        let mut l_numbers = Vec::new();
        for arg in l_args {
            match arg {
                Expr::Range(row, col_start, col_end) => {
                    for col in *col_start..=*col_end {
                        l_numbers.extend(evaluate_cell_at(self.doc, self.sheet_name, *row, col, self.depth).as_number());
                    }
                }
                _ => l_numbers.extend(self.eval(arg).as_number()),
            }
        }
        l_numbers
    }
}

fn is_truthy(value: &EnumEvalValue) -> bool {
    match value {
        EnumEvalValue::Bool(b) => *b,
        EnumEvalValue::Number(n) => *n != 0.0,
        EnumEvalValue::Blank => false,
        EnumEvalValue::Text(s) => panic!("text {s:?} used as a condition"),
    }
}

fn to_number(value: EnumEvalValue) -> f64 {
    match value {
        EnumEvalValue::Number(n) => n,
        EnumEvalValue::Blank => 0.0,
        other => panic!("{other:?} used in arithmetic"),
    }
}

fn eval_binary(op: &str, lhs: EnumEvalValue, rhs: EnumEvalValue) -> EnumEvalValue {
    match op {
        "+" => EnumEvalValue::Number(to_number(lhs) + to_number(rhs)),
        "*" => EnumEvalValue::Number(to_number(lhs) * to_number(rhs)),
        // Blank equals "" and 0; a number never equals text.
        "=" => EnumEvalValue::Bool(match (&lhs, &rhs) {
            (EnumEvalValue::Number(a), EnumEvalValue::Number(b)) => a == b,
            (EnumEvalValue::Text(a), EnumEvalValue::Text(b)) => a.eq_ignore_ascii_case(b),
            (EnumEvalValue::Blank, other) | (other, EnumEvalValue::Blank) => {
                other.is_empty_result() || other.as_number() == Some(0.0)
            }
            _ => false,
        }),
        _ => {
            let (a, b) = (to_number(lhs), to_number(rhs));
            EnumEvalValue::Bool(if op == ">" { a > b } else { a >= b })
        }
    }
}

// #endregion
