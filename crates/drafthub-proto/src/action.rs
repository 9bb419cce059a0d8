// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The action request envelope (spec.md §6) parsed into a closed sum type.
//!
//! Incoming payloads are typed as a tagged union discriminated by `op`.
//! Parsing happens once, here, so the Reducer never branches on weak types
//! (spec.md §9, "Dynamic typing of action payloads").

use crate::rejection::Rejection;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A closed operation the Reducer can apply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op")]
pub enum ActionOp {
    #[serde(rename = "pick")]
    Pick { index: usize, character_code: String },
    #[serde(rename = "ban")]
    Ban { index: usize, character_code: String },
    #[serde(rename = "setEidolon")]
    SetEidolon { index: usize, eidolon: i64 },
    #[serde(rename = "setSuperimpose")]
    SetSuperimpose { index: usize, superimpose: i64 },
    #[serde(rename = "setAccessory")]
    SetAccessory {
        index: usize,
        accessory_id: Option<String>,
    },
    #[serde(rename = "setLock")]
    SetLock { locked: bool },
    #[serde(rename = "undoLast")]
    UndoLast { index: Option<usize> },
}

/// A fully parsed, side-agnostic action request. The caller resolves `pt`
/// (player token) to a `Side` before handing this to the Reducer.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub player_token: String,
    pub op: ActionOp,
}

impl ActionRequest {
    /// Parse a raw JSON envelope, applying the legacy op/field aliases named
    /// in spec.md §6: `setMindscape` → `setEidolon`, `setWengine` →
    /// `setAccessory`, payload field `wengineId` → `accessoryId`, `phase` →
    /// `superimpose`.
    pub fn parse(value: &Value) -> Result<ActionRequest, Rejection> {
        let obj = value.as_object().ok_or(Rejection::InvalidArgument)?;

        let pt = obj
            .get("pt")
            .and_then(Value::as_str)
            .ok_or(Rejection::InvalidArgument)?
            .to_string();

        let raw_op = obj
            .get("op")
            .and_then(Value::as_str)
            .ok_or(Rejection::InvalidArgument)?;
        let op_name = canonical_op_name(raw_op);

        let index = || -> Result<usize, Rejection> {
            obj.get("index")
                .and_then(Value::as_u64)
                .map(|v| v as usize)
                .ok_or(Rejection::InvalidArgument)
        };
        let optional_index = obj.get("index").and_then(Value::as_u64).map(|v| v as usize);
        let character_code = || -> Result<String, Rejection> {
            obj.get("characterCode")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or(Rejection::InvalidArgument)
        };

        let op = match op_name {
            "pick" => ActionOp::Pick {
                index: index()?,
                character_code: character_code()?,
            },
            "ban" => ActionOp::Ban {
                index: index()?,
                character_code: character_code()?,
            },
            "setEidolon" => ActionOp::SetEidolon {
                index: index()?,
                eidolon: obj
                    .get("eidolon")
                    .and_then(Value::as_i64)
                    .ok_or(Rejection::InvalidArgument)?,
            },
            "setSuperimpose" => ActionOp::SetSuperimpose {
                index: index()?,
                superimpose: obj
                    .get("superimpose")
                    .or_else(|| obj.get("phase"))
                    .and_then(Value::as_i64)
                    .ok_or(Rejection::InvalidArgument)?,
            },
            "setAccessory" => {
                let key = if obj.contains_key("accessoryId") {
                    "accessoryId"
                } else {
                    "wengineId"
                };
                let accessory_id = match obj.get(key) {
                    None => None,
                    Some(Value::Null) => None,
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(_) => return Err(Rejection::InvalidArgument),
                };
                ActionOp::SetAccessory {
                    index: index()?,
                    accessory_id,
                }
            }
            "setLock" => ActionOp::SetLock {
                locked: obj
                    .get("locked")
                    .and_then(Value::as_bool)
                    .ok_or(Rejection::InvalidArgument)?,
            },
            "undoLast" => ActionOp::UndoLast {
                index: optional_index,
            },
            _ => return Err(Rejection::InvalidArgument),
        };

        Ok(ActionRequest {
            player_token: pt,
            op,
        })
    }
}

/// Map a legacy op name to its current name; unrecognized names pass through
/// unchanged (and are rejected by the caller's match).
fn canonical_op_name(op: &str) -> &str {
    match op {
        "setMindscape" => "setEidolon",
        "setWengine" => "setAccessory",
        other => other,
    }
}
