use pest::error::{Error, ErrorVariant};
use pest::iterators::{Pair, Pairs};
use pest::{Parser, Position, Span};
use pest_derive::Parser;

use super::ast::*;

#[derive(Parser)]
#[grammar = "parser/chunk_grammar.pest"] // relative to src
pub struct ChunkParser;

const TAB_WIDTH: usize = 2;

impl ChunkParser {
    pub fn parse_chunk(source: &str) -> Result<Block, Error<Rule>> {
        let mut pairs = ChunkParser::parse(Rule::chunk, source)?;
        let chunk = pairs
            .next()
            .ok_or_else(|| {
                Error::new_from_pos(
                    ErrorVariant::CustomError {
                        message: "empty parse result".to_string(),
                    },
                    Position::from_start(source),
                )
            })?;
        let span = chunk.as_span();
        let block = chunk
            .into_inner()
            .find(|p| p.as_rule() == Rule::block)
            .ok_or_else(|| custom_error("missing chunk body", span))?;
        build_block(block)
    }
}

/// Indented dump of the pest token tree, for debugging grammar changes.
pub fn parse_to_token_tree(source: &str) -> Result<String, Error<Rule>> {
    let mut tree = vec![];
    for pair in ChunkParser::parse(Rule::chunk, source)? {
        tree.push(pair_to_string(pair, 0).join("\n"));
    }
    Ok(tree.join("\n"))
}

fn pair_to_string(pair: Pair<Rule>, level: usize) -> Vec<String> {
    let mut tree = vec![];
    let span = pair.as_span();
    tree.push(format!(
        "{}{:?} => ({},{}) #{:?}",
        " ".repeat(level * TAB_WIDTH),
        pair.as_rule(),
        span.start(),
        span.end(),
        span.as_str()
    ));
    for child_pair in pair.into_inner() {
        tree.append(pair_to_string(child_pair, level + 1).as_mut());
    }
    tree
}

fn custom_error(message: &str, span: Span) -> Error<Rule> {
    Error::new_from_span(
        ErrorVariant::CustomError {
            message: message.to_string(),
        },
        span,
    )
}

fn get_unexpected_error(id: i32, pair: &Pair<Rule>) -> Error<Rule> {
    let message = format!("Unexpected state reached [{:?}] - {}", pair.as_rule(), id);
    Error::new_from_span(ErrorVariant::CustomError { message }, pair.as_span())
}

fn next_pair<'i>(pairs: &mut Pairs<'i, Rule>, id: i32, parent: &Pair<'i, Rule>) -> Result<Pair<'i, Rule>, Error<Rule>> {
    pairs.next().ok_or_else(|| get_unexpected_error(id, parent))
}

fn build_block(pair: Pair<Rule>) -> Result<Block, Error<Rule>> {
    let mut statements = vec![];
    let mut ret = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::local_statement => statements.push(build_local_statement(inner)?),
            Rule::assignment => statements.push(build_assignment(inner)?),
            Rule::call_statement => statements.push(build_call_statement(inner)?),
            Rule::return_statement => {
                ret = Some(match inner.into_inner().find(|p| p.as_rule() == Rule::expr_list) {
                    Some(list) => build_expr_list(list)?,
                    None => vec![],
                });
            }
            _ => return Err(get_unexpected_error(1, &inner)),
        }
    }
    Ok(Block { statements, ret })
}

fn build_local_statement(pair: Pair<Rule>) -> Result<Statement, Error<Rule>> {
    let mut inner = pair.clone().into_inner();
    next_pair(&mut inner, 31, &pair)?; // `local`
    let names = next_pair(&mut inner, 2, &pair)?
        .into_inner()
        .map(|n| n.as_str().to_string())
        .collect();
    let values = match inner.next() {
        Some(list) => build_expr_list(list)?,
        None => vec![],
    };
    Ok(Statement::Local { names, values })
}

fn build_assignment(pair: Pair<Rule>) -> Result<Statement, Error<Rule>> {
    let mut inner = pair.clone().into_inner();
    let target_list = next_pair(&mut inner, 3, &pair)?;
    let mut targets = vec![];
    for target in target_list.into_inner() {
        let span = target.as_span();
        let expr = build_suffixed_expr(target)?;
        if !expr.is_assignable() {
            return Err(custom_error("cannot assign to this expression", span));
        }
        targets.push(expr);
    }
    let values = build_expr_list(next_pair(&mut inner, 4, &pair)?)?;
    Ok(Statement::Assign { targets, values })
}

fn build_call_statement(pair: Pair<Rule>) -> Result<Statement, Error<Rule>> {
    let span = pair.as_span();
    let target = next_pair(&mut pair.clone().into_inner(), 5, &pair)?;
    let expr = build_suffixed_expr(target)?;
    if !expr.is_call() {
        return Err(custom_error("syntax error: expression is not a statement", span));
    }
    Ok(Statement::Call(expr))
}

fn build_expr_list(pair: Pair<Rule>) -> Result<Vec<Expression>, Error<Rule>> {
    pair.into_inner().map(build_expression).collect()
}

fn build_expression(pair: Pair<Rule>) -> Result<Expression, Error<Rule>> {
    match pair.as_rule() {
        Rule::expr => {
            let inner = next_pair(&mut pair.clone().into_inner(), 6, &pair)?;
            build_expression(inner)
        }
        Rule::or_expr | Rule::and_expr | Rule::cmp_expr | Rule::add_expr | Rule::mul_expr => {
            build_left_assoc(pair)
        }
        Rule::concat_expr => build_concat(pair),
        Rule::unary_expr => build_unary(pair),
        Rule::nil_literal => Ok(Expression::Nil),
        Rule::true_literal => Ok(Expression::Boolean(true)),
        Rule::false_literal => Ok(Expression::Boolean(false)),
        Rule::integer => Ok(match pair.as_str().parse::<i64>() {
            Ok(n) => Expression::Integer(n),
            Err(_) => Expression::Number(parse_float(&pair)?),
        }),
        Rule::hex_integer => {
            let digits = &pair.as_str()[2..];
            match i64::from_str_radix(digits, 16) {
                Ok(n) => Ok(Expression::Integer(n)),
                Err(_) => Err(custom_error("hexadecimal literal is too large", pair.as_span())),
            }
        }
        Rule::float => Ok(Expression::Number(parse_float(&pair)?)),
        Rule::string => Ok(Expression::String(build_string(pair)?)),
        Rule::varargs => Ok(Expression::VarArgs),
        Rule::table_constructor => build_table(pair),
        Rule::suffixed_expr => build_suffixed_expr(pair),
        _ => Err(get_unexpected_error(7, &pair)),
    }
}

fn parse_float(pair: &Pair<Rule>) -> Result<f64, Error<Rule>> {
    pair.as_str()
        .parse::<f64>()
        .map_err(|_| custom_error("malformed number", pair.as_span()))
}

/// `a op b op c` folded to the left.
fn build_left_assoc(pair: Pair<Rule>) -> Result<Expression, Error<Rule>> {
    let mut inner = pair.clone().into_inner();
    let mut left = build_expression(next_pair(&mut inner, 8, &pair)?)?;
    while let Some(op_pair) = inner.next() {
        let op = BinaryOp::from_symbol(op_pair.as_str())
            .ok_or_else(|| get_unexpected_error(9, &op_pair))?;
        let right = build_expression(next_pair(&mut inner, 10, &pair)?)?;
        left = Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
    }
    Ok(left)
}

/// `..` is right associative.
fn build_concat(pair: Pair<Rule>) -> Result<Expression, Error<Rule>> {
    let mut inner = pair.clone().into_inner();
    let left = build_expression(next_pair(&mut inner, 11, &pair)?)?;
    match inner.next() {
        None => Ok(left),
        Some(_op) => {
            let right = build_expression(next_pair(&mut inner, 12, &pair)?)?;
            Ok(Expression::Binary {
                op: BinaryOp::Concat,
                left: Box::new(left),
                right: Box::new(right),
            })
        }
    }
}

fn build_unary(pair: Pair<Rule>) -> Result<Expression, Error<Rule>> {
    let mut inner = pair.clone().into_inner();
    let first = next_pair(&mut inner, 13, &pair)?;
    if first.as_rule() != Rule::unary_op {
        return build_expression(first);
    }
    let op = if first.as_str() == "-" {
        UnaryOp::Minus
    } else {
        UnaryOp::Not
    };
    let operand = build_expression(next_pair(&mut inner, 14, &pair)?)?;
    Ok(Expression::Unary {
        op,
        operand: Box::new(operand),
    })
}

fn build_string(pair: Pair<Rule>) -> Result<String, Error<Rule>> {
    let span = pair.as_span();
    let content = next_pair(&mut pair.clone().into_inner(), 15, &pair)?;
    let mut out = String::with_capacity(content.as_str().len());
    let mut chars = content.as_str().chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(c @ ('\\' | '"' | '\'')) => out.push(c),
            _ => return Err(custom_error("invalid escape sequence", span.clone())),
        }
    }
    Ok(out)
}

fn build_table(pair: Pair<Rule>) -> Result<Expression, Error<Rule>> {
    let mut fields = vec![];
    for field in pair.into_inner() {
        let rule = field.as_rule();
        let mut inner = field.clone().into_inner();
        fields.push(match rule {
            Rule::positional_field => {
                TableField::Positional(build_expression(next_pair(&mut inner, 16, &field)?)?)
            }
            Rule::named_field => {
                let name = next_pair(&mut inner, 17, &field)?.as_str().to_string();
                let value = build_expression(next_pair(&mut inner, 18, &field)?)?;
                TableField::Keyed(Expression::String(name), value)
            }
            Rule::keyed_field => {
                let key = build_expression(next_pair(&mut inner, 19, &field)?)?;
                let value = build_expression(next_pair(&mut inner, 20, &field)?)?;
                TableField::Keyed(key, value)
            }
            _ => return Err(get_unexpected_error(21, &field)),
        });
    }
    Ok(Expression::Table(fields))
}

fn build_suffixed_expr(pair: Pair<Rule>) -> Result<Expression, Error<Rule>> {
    let mut inner = pair.clone().into_inner();
    let primary = next_pair(&mut inner, 22, &pair)?;
    let mut expr = match primary.as_rule() {
        Rule::name => Expression::Name(primary.as_str().to_string()),
        Rule::paren_expr => {
            let e = next_pair(&mut primary.clone().into_inner(), 23, &primary)?;
            Expression::Paren(Box::new(build_expression(e)?))
        }
        _ => return Err(get_unexpected_error(24, &primary)),
    };
    for suffix in inner {
        expr = match suffix.as_rule() {
            Rule::field_suffix => {
                let name = next_pair(&mut suffix.clone().into_inner(), 25, &suffix)?;
                Expression::Index {
                    object: Box::new(expr),
                    key: Box::new(Expression::String(name.as_str().to_string())),
                }
            }
            Rule::index_suffix => {
                let key = next_pair(&mut suffix.clone().into_inner(), 26, &suffix)?;
                Expression::Index {
                    object: Box::new(expr),
                    key: Box::new(build_expression(key)?),
                }
            }
            Rule::method_call => {
                let mut parts = suffix.clone().into_inner();
                let method = next_pair(&mut parts, 27, &suffix)?.as_str().to_string();
                let args = build_call_args(next_pair(&mut parts, 28, &suffix)?)?;
                Expression::MethodCall {
                    object: Box::new(expr),
                    method,
                    args,
                }
            }
            Rule::call => {
                let args = next_pair(&mut suffix.clone().into_inner(), 29, &suffix)?;
                Expression::Call {
                    callee: Box::new(expr),
                    args: build_call_args(args)?,
                }
            }
            _ => return Err(get_unexpected_error(30, &suffix)),
        };
    }
    Ok(expr)
}

fn build_call_args(pair: Pair<Rule>) -> Result<Vec<Expression>, Error<Rule>> {
    match pair.into_inner().next() {
        None => Ok(vec![]),
        Some(arg) => match arg.as_rule() {
            Rule::expr_list => build_expr_list(arg),
            _ => Ok(vec![build_expression(arg)?]),
        },
    }
}
