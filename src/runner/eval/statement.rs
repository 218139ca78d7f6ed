//! Statement execution.

use crate::parser::ast::{Block, Expression, Statement};
use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::Value;

use super::expression::{assign_index, evaluate_expression, evaluate_expression_list, evaluate_multi};
use super::types::{Frame, MultiValueResult};

/// Run every statement, then evaluate the `return` list if there is one.
pub fn execute_block(block: &Block, frame: &mut Frame) -> MultiValueResult {
    for stmt in &block.statements {
        execute_statement(stmt, frame)?;
    }
    match &block.ret {
        Some(exprs) => evaluate_expression_list(exprs, frame),
        None => Ok(vec![]),
    }
}

pub fn execute_statement(stmt: &Statement, frame: &mut Frame) -> Result<(), ErrorType> {
    match stmt {
        Statement::Local { names, values } => {
            let mut values = evaluate_expression_list(values, frame)?.into_iter();
            for name in names {
                let value = values.next().unwrap_or(Value::Nil);
                frame.locals.insert(name.clone(), value);
            }
            Ok(())
        }
        Statement::Assign { targets, values } => {
            let mut values = evaluate_expression_list(values, frame)?.into_iter();
            for target in targets {
                let value = values.next().unwrap_or(Value::Nil);
                assign(target, value, frame)?;
            }
            Ok(())
        }
        Statement::Call(expr) => {
            evaluate_multi(expr, frame)?;
            Ok(())
        }
    }
}

fn assign(target: &Expression, value: Value, frame: &mut Frame) -> Result<(), ErrorType> {
    match target {
        Expression::Name(name) => frame.assign(name, value),
        Expression::Index { object, key } => {
            let object = evaluate_expression(object, frame)?;
            let key = evaluate_expression(key, frame)?;
            assign_index(&frame.env, &object, key, value)
        }
        _ => Err(ErrorType::type_error("cannot assign to this expression")),
    }
}
